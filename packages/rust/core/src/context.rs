//! Per-run state threaded through the enricher and reviser.

use tokio_util::sync::CancellationToken;

use markfill_shared::{BookmarkDocument, ReviseEntry};

/// Everything one run mutates, plus the token that stops it.
#[derive(Debug)]
pub struct RunContext {
    /// The bookmark tree, enriched in place.
    pub document: BookmarkDocument,
    /// Items that still need a manual description, in document order.
    pub revise: Vec<ReviseEntry>,
    cancel: CancellationToken,
}

impl RunContext {
    pub fn new(document: BookmarkDocument, cancel: CancellationToken) -> Self {
        Self {
            document,
            revise: Vec::new(),
            cancel,
        }
    }

    /// Start from an existing revise list (deferred revision).
    pub fn with_revise_list(mut self, revise: Vec<ReviseEntry>) -> Self {
        self.revise = revise;
        self
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
