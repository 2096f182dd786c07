//! Favicon URL derivation.

use url::Url;

/// Builds favicon URLs of the form `<base>/<host>?larger=true`.
#[derive(Debug, Clone)]
pub struct FaviconBuilder {
    base: String,
}

impl FaviconBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { base }
    }

    /// Favicon URL for the site behind `link`.
    pub fn build(&self, link: &str) -> String {
        format!("{}/{}?larger=true", self.base, host_of(link))
    }
}

/// Host (and explicit port) of a link.
///
/// Links that do not parse as URLs fall back to the text between `//` and
/// the next `/`, or the whole trimmed link when there is no `//`.
fn host_of(link: &str) -> String {
    if let Ok(url) = Url::parse(link.trim()) {
        if let Some(host) = url.host_str() {
            return match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            };
        }
    }

    let rest = link
        .trim()
        .split_once("//")
        .map_or(link.trim(), |(_, rest)| rest);
    rest.split(['/', '?', '#']).next().unwrap_or(rest).to_string()
}
