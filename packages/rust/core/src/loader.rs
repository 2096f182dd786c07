//! Reading bookmark and revise-needs documents from disk.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use markfill_shared::{BookmarkDocument, MarkfillError, Result, ReviseEntry};

/// Load a bookmark document (`input.yml` or a previously written `bookmarks.yml`).
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn load_document(path: &Path) -> Result<BookmarkDocument> {
    let document: BookmarkDocument = read_yaml(path).await?;
    debug!(
        categories = document.0.len(),
        items = document.total_items(),
        "bookmark document loaded"
    );
    Ok(document)
}

/// Load a revise-needs list written by a previous run.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn load_revise_list(path: &Path) -> Result<Vec<ReviseEntry>> {
    let entries: Vec<ReviseEntry> = read_yaml(path).await?;
    debug!(entries = entries.len(), "revise list loaded");
    Ok(entries)
}

async fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MarkfillError::io(path, e))?;

    serde_yaml::from_str(&content).map_err(|e| MarkfillError::document(path, e.to_string()))
}
