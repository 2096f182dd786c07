//! Application configuration for markfill.
//!
//! User config lives at `~/.markfill/markfill.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{MarkfillError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "markfill.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".markfill";

// ---------------------------------------------------------------------------
// Config structs (matching markfill.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Lookup service settings.
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Input/output file locations.
    #[serde(default)]
    pub files: FilesConfig,
}

/// `[lookup]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Website-info endpoint, queried as `<endpoint>?url=<link>`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Favicon service base; the link host is appended as a path segment.
    #[serde(default = "default_favicon_base")]
    pub favicon_base: String,

    /// Maximum lookups in flight. 0 issues every lookup at once.
    #[serde(default)]
    pub concurrency: usize,

    /// Per-request timeout. Unset means requests only end on abort.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            favicon_base: default_favicon_base(),
            concurrency: 0,
            timeout_secs: None,
        }
    }
}

impl LookupConfig {
    /// Parse the configured endpoint.
    pub fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint).map_err(|e| {
            MarkfillError::config(format!("invalid lookup endpoint '{}': {e}", self.endpoint))
        })
    }
}

fn default_endpoint() -> String {
    "https://api.ahfi.cn/api/websiteinfo".into()
}
fn default_favicon_base() -> String {
    "https://favicon.im".into()
}

/// `[files]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Bookmark list to enrich.
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Enriched bookmark document.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Entries that still need a manual description.
    #[serde(default = "default_revise_output")]
    pub revise_output: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            revise_output: default_revise_output(),
        }
    }
}

fn default_input() -> PathBuf {
    "input.yml".into()
}
fn default_output() -> PathBuf {
    "bookmarks.yml".into()
}
fn default_revise_output() -> PathBuf {
    "revise_needs.yml".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.markfill/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MarkfillError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.markfill/markfill.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MarkfillError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| MarkfillError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MarkfillError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| MarkfillError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MarkfillError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
