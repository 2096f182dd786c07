//! Website description lookup and favicon derivation.
//!
//! Descriptions come from a website-info service queried as
//! `GET <endpoint>?url=<link>`, which answers with
//! `{ "code": int, "data": { "description": string } }`. Every way a lookup
//! can go wrong is folded into a [`LookupFailure`] value; none of them are
//! errors for the caller, they only mean the bookmark needs a manual
//! description.

mod favicon;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

use markfill_shared::{LookupConfig, MarkfillError, Result};

pub use favicon::FaviconBuilder;

/// Maximum number of redirects to follow when calling the service.
const MAX_REDIRECTS: usize = 3;

/// User-Agent string for lookup requests.
const USER_AGENT: &str = concat!("markfill/", env!("CARGO_PKG_VERSION"));

/// Service code for a site that refused to be crawled.
const CODE_ANTI_CRAWL: i64 = 202;

/// Service code for a site the service could not reach.
const CODE_NOT_FOUND: i64 = 404;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why a description could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupFailure {
    /// The request never produced a usable response.
    #[error("{0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status.
    #[error("fetch failed (HTTP {0})")]
    FetchFailed(u16),

    /// The target site blocks crawlers.
    #[error("blocked by anti-crawling")]
    AntiCrawl,

    /// The service could not find the site.
    #[error("site not found")]
    NotFound,

    /// Any other service code outside 200..=299.
    #[error("lookup service error (code {0})")]
    Service(i64),

    /// The request was aborted.
    #[error("cancelled")]
    Cancelled,
}

/// A trimmed description, or the reason there is none.
pub type LookupOutcome = std::result::Result<String, LookupFailure>;

/// Source of site descriptions.
#[async_trait]
pub trait DescriptionLookup: Send + Sync {
    /// Look up the description for `link`.
    ///
    /// Must resolve to [`LookupFailure::Cancelled`] promptly once `cancel`
    /// fires.
    async fn describe(&self, link: &str, cancel: &CancellationToken) -> LookupOutcome;
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for [`LookupClient`].
#[derive(Debug, Clone)]
pub struct LookupOptions {
    /// Website-info endpoint.
    pub endpoint: Url,
    /// Per-request timeout; `None` leaves requests unbounded.
    pub timeout_secs: Option<u64>,
}

impl LookupOptions {
    pub fn from_config(config: &LookupConfig) -> Result<Self> {
        Ok(Self {
            endpoint: config.endpoint_url()?,
            timeout_secs: config.timeout_secs,
        })
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the website-info service.
pub struct LookupClient {
    client: Client,
    endpoint: Url,
}

impl LookupClient {
    /// Create a new client with the given options.
    pub fn new(opts: &LookupOptions) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));

        if let Some(secs) = opts.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| MarkfillError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: opts.endpoint.clone(),
        })
    }

    async fn fetch(&self, link: &str) -> LookupOutcome {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("url", link)])
            .send()
            .await
            .map_err(|e| LookupFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupFailure::FetchFailed(status.as_u16()));
        }

        let info: WebsiteInfo = response
            .json()
            .await
            .map_err(|e| LookupFailure::Transport(format!("invalid response body: {e}")))?;

        interpret(info)
    }
}

#[async_trait]
impl DescriptionLookup for LookupClient {
    #[instrument(skip_all, fields(link = %link))]
    async fn describe(&self, link: &str, cancel: &CancellationToken) -> LookupOutcome {
        if cancel.is_cancelled() {
            return Err(LookupFailure::Cancelled);
        }

        // Dropping the in-flight request future aborts the connection.
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LookupFailure::Cancelled),
            outcome = self.fetch(link) => outcome,
        };

        match &outcome {
            Ok(description) => debug!(len = description.len(), "description received"),
            Err(reason) => debug!(%reason, "lookup failed"),
        }
        outcome
    }
}

// ---------------------------------------------------------------------------
// Response interpretation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WebsiteInfo {
    code: i64,
    #[serde(default)]
    data: Option<WebsiteData>,
}

#[derive(Debug, Deserialize)]
struct WebsiteData {
    #[serde(default)]
    description: Option<String>,
}

/// Map a decoded service response to an outcome.
fn interpret(info: WebsiteInfo) -> LookupOutcome {
    match info.code {
        CODE_ANTI_CRAWL => Err(LookupFailure::AntiCrawl),
        CODE_NOT_FOUND => Err(LookupFailure::NotFound),
        code if !(200..=299).contains(&code) => Err(LookupFailure::Service(code)),
        _ => info
            .data
            .and_then(|d| d.description)
            .map(|d| d.trim().to_string())
            .ok_or_else(|| LookupFailure::Transport("response has no description".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn info(code: i64, description: Option<&str>) -> WebsiteInfo {
        WebsiteInfo {
            code,
            data: Some(WebsiteData {
                description: description.map(String::from),
            }),
        }
    }

    async fn client_for(server: &MockServer) -> LookupClient {
        let opts = LookupOptions {
            endpoint: Url::parse(&format!("{}/api/websiteinfo", server.uri())).unwrap(),
            timeout_secs: None,
        };
        LookupClient::new(&opts).unwrap()
    }

    #[test]
    fn test_interpret_service_codes() {
        assert_eq!(interpret(info(202, None)), Err(LookupFailure::AntiCrawl));
        assert_eq!(interpret(info(404, None)), Err(LookupFailure::NotFound));
        assert_eq!(interpret(info(500, None)), Err(LookupFailure::Service(500)));
        assert_eq!(interpret(info(199, None)), Err(LookupFailure::Service(199)));
    }

    #[test]
    fn test_interpret_trims_description() {
        let outcome = interpret(info(200, Some("  A code host.\n")));
        assert_eq!(outcome, Ok("A code host.".to_string()));

        // Whitespace-only is still a success; the caller decides it needs revision.
        assert_eq!(interpret(info(299, Some("   "))), Ok(String::new()));
    }

    #[test]
    fn test_interpret_missing_data() {
        let outcome = interpret(WebsiteInfo { code: 200, data: None });
        assert!(matches!(outcome, Err(LookupFailure::Transport(_))));
    }

    #[test]
    fn test_options_from_config() {
        let opts = LookupOptions::from_config(&LookupConfig::default()).unwrap();
        assert_eq!(opts.endpoint.path(), "/api/websiteinfo");
        assert!(opts.timeout_secs.is_none());
    }

    #[tokio::test]
    async fn test_describe_with_mock_server() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/websiteinfo"))
            .and(query_param("url", "https://github.com/rust-lang?tab=repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 200,
                "data": { "description": " Where the world builds software. " }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let outcome = client
            .describe(
                "https://github.com/rust-lang?tab=repos",
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome, Ok("Where the world builds software.".to_string()));
    }

    #[tokio::test]
    async fn test_describe_service_error_codes() {
        let server = MockServer::start().await;

        for (link, code) in [("https://a.example", 202), ("https://b.example", 404)] {
            Mock::given(query_param("url", link))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "code": code })),
                )
                .mount(&server)
                .await;
        }

        let client = client_for(&server).await;
        let token = CancellationToken::new();

        assert_eq!(
            client.describe("https://a.example", &token).await,
            Err(LookupFailure::AntiCrawl)
        );
        assert_eq!(
            client.describe("https://b.example", &token).await,
            Err(LookupFailure::NotFound)
        );
    }

    #[tokio::test]
    async fn test_describe_http_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let outcome = client
            .describe("https://example.com", &CancellationToken::new())
            .await;

        assert_eq!(outcome, Err(LookupFailure::FetchFailed(503)));
    }

    #[tokio::test]
    async fn test_describe_invalid_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let outcome = client
            .describe("https://example.com", &CancellationToken::new())
            .await;

        assert!(matches!(outcome, Err(LookupFailure::Transport(_))));
    }

    #[tokio::test]
    async fn test_describe_unreachable_endpoint() {
        // Reserve a free port, then release it so nothing is listening there.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let opts = LookupOptions {
            endpoint: Url::parse(&format!("http://127.0.0.1:{port}/api")).unwrap(),
            timeout_secs: Some(5),
        };
        let client = LookupClient::new(&opts).unwrap();

        let outcome = client
            .describe("https://example.com", &CancellationToken::new())
            .await;

        assert!(matches!(outcome, Err(LookupFailure::Transport(_))));
    }

    #[tokio::test]
    async fn test_describe_aborts_on_cancel() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(
                        serde_json::json!({ "code": 200, "data": { "description": "late" } }),
                    )
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let outcome = client.describe("https://example.com", &token).await;

        assert_eq!(outcome, Err(LookupFailure::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_describe_skips_request_when_already_cancelled() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let token = CancellationToken::new();
        token.cancel();

        let outcome = client.describe("https://example.com", &token).await;
        assert_eq!(outcome, Err(LookupFailure::Cancelled));
    }
}
