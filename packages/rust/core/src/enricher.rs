//! Concurrent description lookup for every bookmark.
//!
//! All item lookups are driven from one task through a single
//! `buffer_unordered` stream, so they interleave at network suspension
//! points without any locking. Each lookup future owns a disjoint
//! `&mut Item`.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use markfill_lookup::{DescriptionLookup, FaviconBuilder, LookupFailure};
use markfill_shared::{Item, ReviseEntry};

use crate::context::RunContext;

/// Counts from one enrichment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    /// Items in the document.
    pub total: usize,
    /// Items that received a non-empty description.
    pub described: usize,
    /// Items queued for manual revision.
    pub needs_revision: usize,
    /// Items left untouched because the run was cancelled.
    pub skipped: usize,
}

/// Progress callback for reporting per-item status.
pub trait EnrichProgress: Send + Sync {
    /// Called when a lookup is about to be issued.
    fn item_started(&self, name: &str, current: usize, total: usize);
    /// Called when an item received a description.
    fn item_described(&self, name: &str);
    /// Called when an item was queued for revision; `reason` is `None` when
    /// the service answered with an empty description.
    fn item_needs_revision(&self, name: &str, reason: Option<&LookupFailure>);
    /// Called once every lookup has settled.
    fn finished(&self, summary: &EnrichSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl EnrichProgress for SilentProgress {
    fn item_started(&self, _name: &str, _current: usize, _total: usize) {}
    fn item_described(&self, _name: &str) {}
    fn item_needs_revision(&self, _name: &str, _reason: Option<&LookupFailure>) {}
    fn finished(&self, _summary: &EnrichSummary) {}
}

/// What happened to one item.
enum ItemRecord {
    Described,
    NeedsRevision(ReviseEntry),
    Skipped,
}

/// Borrowed collaborators shared by every item future.
struct Shared<'a> {
    lookup: &'a dyn DescriptionLookup,
    favicon: &'a FaviconBuilder,
    progress: &'a dyn EnrichProgress,
    cancel: &'a CancellationToken,
    started: AtomicUsize,
    total: usize,
}

/// Fill in `image` and `description` for every item in `ctx.document`.
///
/// Items with no usable description are appended to `ctx.revise` in
/// document order. `concurrency` caps the lookups in flight; 0 issues all
/// of them at once. Once the context is cancelled, items that have not yet
/// recorded a result are left unchanged.
#[instrument(skip_all, fields(total = ctx.document.total_items(), concurrency = concurrency))]
pub async fn enrich(
    ctx: &mut RunContext,
    lookup: &dyn DescriptionLookup,
    favicon: &FaviconBuilder,
    concurrency: usize,
    progress: &dyn EnrichProgress,
) -> EnrichSummary {
    let cancel = ctx.cancel_token().clone();
    let total = ctx.document.total_items();
    let limit = if concurrency == 0 { usize::MAX } else { concurrency };

    info!(total, "starting enrichment");

    let shared = Shared {
        lookup,
        favicon,
        progress,
        cancel: &cancel,
        started: AtomicUsize::new(0),
        total,
    };

    let tasks = ctx
        .document
        .0
        .iter_mut()
        .flat_map(|category| {
            let name = category.category.clone();
            category
                .items
                .iter_mut()
                .map(move |item| (name.clone(), item))
        })
        .enumerate()
        .map(|(index, (category, item))| {
            let shared = &shared;
            async move { (index, enrich_item(item, &category, shared).await) }
        });

    let mut records: Vec<(usize, ItemRecord)> =
        stream::iter(tasks).buffer_unordered(limit).collect().await;
    records.sort_by_key(|(index, _)| *index);

    let mut summary = EnrichSummary {
        total,
        ..EnrichSummary::default()
    };
    for (_, record) in records {
        match record {
            ItemRecord::Described => summary.described += 1,
            ItemRecord::NeedsRevision(entry) => {
                summary.needs_revision += 1;
                ctx.revise.push(entry);
            }
            ItemRecord::Skipped => summary.skipped += 1,
        }
    }

    progress.finished(&summary);
    info!(
        described = summary.described,
        needs_revision = summary.needs_revision,
        skipped = summary.skipped,
        cancelled = cancel.is_cancelled(),
        "enrichment finished"
    );

    summary
}

async fn enrich_item(item: &mut Item, category: &str, shared: &Shared<'_>) -> ItemRecord {
    if shared.cancel.is_cancelled() {
        return ItemRecord::Skipped;
    }

    let current = shared.started.fetch_add(1, Ordering::Relaxed) + 1;
    shared.progress.item_started(&item.name, current, shared.total);

    let image = shared.favicon.build(&item.link);
    let outcome = shared.lookup.describe(&item.link, shared.cancel).await;

    if shared.cancel.is_cancelled() {
        debug!(name = %item.name, "cancelled before recording result");
        return ItemRecord::Skipped;
    }

    item.image = image;
    match outcome {
        Ok(description) if !description.is_empty() => {
            item.description = description;
            shared.progress.item_described(&item.name);
            ItemRecord::Described
        }
        Ok(_) => {
            item.description.clear();
            shared.progress.item_needs_revision(&item.name, None);
            ItemRecord::NeedsRevision(ReviseEntry::for_item(item, category))
        }
        Err(reason) => {
            debug!(name = %item.name, %reason, "no description");
            item.description.clear();
            shared.progress.item_needs_revision(&item.name, Some(&reason));
            ItemRecord::NeedsRevision(ReviseEntry::for_item(item, category))
        }
    }
}
