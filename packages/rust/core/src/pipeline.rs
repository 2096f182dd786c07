//! End-to-end workflows.
//!
//! `enrich`: load → look up descriptions → ask whether to revise →
//! either write both documents now, or revise interactively and write the
//! bookmark document afterwards. Cancellation at any point ends the run
//! without writing anything.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use markfill_lookup::{DescriptionLookup, FaviconBuilder};
use markfill_shared::{AppConfig, BookmarkDocument, Result, ReviseEntry};

use crate::context::RunContext;
use crate::enricher::{self, EnrichProgress, EnrichSummary};
use crate::reviser::{self, Prompter, ReviseReport, ReviseStatus};
use crate::{loader, writer};

/// Configuration for [`run_enrichment`].
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Bookmark list to enrich.
    pub input: PathBuf,
    /// Where the enriched document goes.
    pub output: PathBuf,
    /// Where unresolved entries go when revision is declined.
    pub revise_output: PathBuf,
    /// Favicon service base URL.
    pub favicon_base: String,
    /// Maximum lookups in flight (0 = unbounded).
    pub concurrency: usize,
}

impl From<&AppConfig> for RunConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            input: config.files.input.clone(),
            output: config.files.output.clone(),
            revise_output: config.files.revise_output.clone(),
            favicon_base: config.lookup.favicon_base.clone(),
            concurrency: config.lookup.concurrency,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Revision declined; the bookmark document and the revise list were written.
    Provisioned { summary: EnrichSummary },
    /// Revision completed; the bookmark document was written.
    Revised {
        summary: EnrichSummary,
        report: ReviseReport,
    },
    /// Cancelled; nothing was written.
    Aborted,
}

/// Run the full `enrich` workflow.
#[instrument(skip_all, fields(input = %config.input.display()))]
pub async fn run_enrichment(
    config: &RunConfig,
    lookup: &dyn DescriptionLookup,
    prompter: &mut dyn Prompter,
    progress: &dyn EnrichProgress,
    cancel: CancellationToken,
) -> Result<RunOutcome> {
    let document = loader::load_document(&config.input).await?;
    let mut ctx = RunContext::new(document, cancel);

    let favicon = FaviconBuilder::new(config.favicon_base.as_str());
    let summary = enricher::enrich(&mut ctx, lookup, &favicon, config.concurrency, progress).await;

    if ctx.is_cancelled() {
        info!("run aborted during enrichment");
        return Ok(RunOutcome::Aborted);
    }

    let accepted = match prompter.confirm_revision(ctx.revise.len()).await? {
        Some(accepted) if !ctx.is_cancelled() => accepted,
        _ => {
            info!("run aborted before revision choice");
            return Ok(RunOutcome::Aborted);
        }
    };

    if !accepted {
        writer::write_document(&config.output, &ctx.document).await?;
        writer::write_revise_list(&config.revise_output, &ctx.revise).await?;
        return Ok(RunOutcome::Provisioned { summary });
    }

    let report = reviser::revise(&mut ctx, prompter, |_, report| report).await?;
    if report.status == ReviseStatus::Cancelled {
        info!("run aborted during revision");
        return Ok(RunOutcome::Aborted);
    }

    writer::write_document(&config.output, &ctx.document).await?;
    Ok(RunOutcome::Revised { summary, report })
}

/// Revise entries from an earlier run's revise-needs file.
///
/// On completion, writes the bookmark document back and rewrites the
/// revise-needs file with whatever is still unresolved. Returns `None`,
/// writing nothing, when cancelled.
#[instrument(skip_all, fields(bookmarks = %bookmarks.display(), needs = %needs.display()))]
pub async fn run_deferred_revision(
    bookmarks: &Path,
    needs: &Path,
    prompter: &mut dyn Prompter,
    cancel: CancellationToken,
) -> Result<Option<ReviseReport>> {
    let document = loader::load_document(bookmarks).await?;
    let entries = loader::load_revise_list(needs).await?;

    let stale = count_stale_entries(&document, &entries);
    if stale > 0 {
        warn!(stale, "revise entries no longer match a bookmark");
    }

    let mut ctx = RunContext::new(document, cancel).with_revise_list(entries);

    let report = reviser::revise(&mut ctx, prompter, |_, report| report).await?;
    if report.status == ReviseStatus::Cancelled {
        info!("deferred revision aborted");
        return Ok(None);
    }

    writer::write_document(bookmarks, &ctx.document).await?;
    writer::write_revise_list(needs, &report.remaining).await?;
    Ok(Some(report))
}

/// Entries whose (category, name) no longer points at any bookmark.
fn count_stale_entries(document: &BookmarkDocument, entries: &[ReviseEntry]) -> usize {
    entries
        .iter()
        .filter(|e| document.find_item(&e.category, &e.name).is_none())
        .count()
}
