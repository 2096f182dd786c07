//! Interactive, one-at-a-time revision of items without a description.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use markfill_shared::{BookmarkDocument, Result, ReviseEntry};

use crate::context::RunContext;

/// Interactive input used by the pipeline.
#[async_trait]
pub trait Prompter: Send {
    /// Ask whether to revise the `pending` entries now.
    ///
    /// `None` means input was closed before an answer arrived.
    async fn confirm_revision(&mut self, pending: usize) -> Result<Option<bool>>;

    /// Ask for a description of `entry` (`position` is 1-based).
    ///
    /// `None` means input was closed before an answer arrived.
    async fn ask_description(
        &mut self,
        entry: &ReviseEntry,
        position: usize,
        total: usize,
    ) -> Result<Option<String>>;

    /// Called after an answer for `entry` was stored.
    fn revised(&mut self, _entry: &ReviseEntry, _position: usize, _total: usize) {}
}

/// How the revision loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviseStatus {
    /// Every entry was prompted for.
    Completed,
    /// Cancellation or closed input stopped the loop early.
    Cancelled,
}

/// Result of a revision loop, handed to the completion callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviseReport {
    pub status: ReviseStatus,
    /// Answers written into the document.
    pub applied: usize,
    /// Entries with no matching item; their answers were dropped.
    pub unmatched: usize,
    /// Entries still without a description: blank answers, unmatched
    /// entries, and entries never reached.
    pub remaining: Vec<ReviseEntry>,
}

/// Write `description` into the first item matching `entry`.
///
/// Returns `false`, leaving the document unchanged, when no item matches.
pub fn apply_revision(
    document: &mut BookmarkDocument,
    entry: &ReviseEntry,
    description: &str,
) -> bool {
    match document.find_item_mut(&entry.category, &entry.name) {
        Some(item) => {
            item.description = description.to_string();
            true
        }
        None => {
            debug!(
                name = %entry.name,
                category = %entry.category,
                "no matching item, revision dropped"
            );
            false
        }
    }
}

/// Prompt for every entry in `ctx.revise`, in order, then call `on_finish`.
///
/// The loop stops early when the context is cancelled or the prompter
/// reports closed input; `on_finish` runs either way and its value is
/// returned.
#[instrument(skip_all, fields(entries = ctx.revise.len()))]
pub async fn revise<F, T>(
    ctx: &mut RunContext,
    prompter: &mut dyn Prompter,
    on_finish: F,
) -> Result<T>
where
    F: FnOnce(&RunContext, ReviseReport) -> T,
{
    let entries = ctx.revise.clone();
    let total = entries.len();
    let mut report = ReviseReport {
        status: ReviseStatus::Completed,
        applied: 0,
        unmatched: 0,
        remaining: Vec::new(),
    };

    for (index, entry) in entries.iter().enumerate() {
        let position = index + 1;

        let answer = if ctx.is_cancelled() {
            None
        } else {
            prompter.ask_description(entry, position, total).await?
        };

        let Some(answer) = answer.filter(|_| !ctx.is_cancelled()) else {
            report.status = ReviseStatus::Cancelled;
            report.remaining.extend(entries[index..].iter().cloned());
            break;
        };

        let description = answer.trim();
        if apply_revision(&mut ctx.document, entry, description) {
            report.applied += 1;
            if description.is_empty() {
                report.remaining.push(entry.clone());
            }
        } else {
            report.unmatched += 1;
            report.remaining.push(entry.clone());
        }
        prompter.revised(entry, position, total);
    }

    info!(
        status = ?report.status,
        applied = report.applied,
        unmatched = report.unmatched,
        remaining = report.remaining.len(),
        "revision finished"
    );

    Ok(on_finish(ctx, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use markfill_shared::{Category, Item, MarkfillError};
    use tokio_util::sync::CancellationToken;

    /// Prompter that replays canned answers; `None` simulates closed input.
    struct ScriptedPrompter {
        answers: VecDeque<Option<String>>,
        asked: Vec<String>,
        revised: Vec<(String, usize, usize)>,
        cancel_after_ask: Option<CancellationToken>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[Option<&str>]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.map(String::from)).collect(),
                asked: Vec::new(),
                revised: Vec::new(),
                cancel_after_ask: None,
            }
        }
    }

    #[async_trait]
    impl Prompter for ScriptedPrompter {
        async fn confirm_revision(&mut self, _pending: usize) -> Result<Option<bool>> {
            Ok(Some(true))
        }

        async fn ask_description(
            &mut self,
            entry: &ReviseEntry,
            _position: usize,
            _total: usize,
        ) -> Result<Option<String>> {
            self.asked.push(entry.name.clone());
            if let Some(token) = &self.cancel_after_ask {
                token.cancel();
            }
            self.answers
                .pop_front()
                .ok_or_else(|| MarkfillError::Prompt("no scripted answer left".into()))
        }

        fn revised(&mut self, entry: &ReviseEntry, position: usize, total: usize) {
            self.revised.push((entry.name.clone(), position, total));
        }
    }

    fn entry(category: &str, name: &str) -> ReviseEntry {
        ReviseEntry {
            name: name.into(),
            link: format!("https://{}.example", name.to_lowercase()),
            category: category.into(),
        }
    }

    fn context(token: CancellationToken) -> RunContext {
        let document = BookmarkDocument(vec![
            Category::new(
                "Dev",
                vec![
                    Item::new("Forge", "https://forge.example"),
                    Item::new("Forge", "https://forge.example/mirror"),
                    Item::new("Wiki", "https://wiki.example"),
                ],
            ),
            Category::new("News", vec![Item::new("Daily", "https://daily.example")]),
        ]);
        RunContext::new(document, token).with_revise_list(vec![
            entry("Dev", "Forge"),
            entry("Dev", "Wiki"),
            entry("News", "Daily"),
        ])
    }

    #[test]
    fn test_apply_revision_updates_first_match_only() {
        let mut ctx = context(CancellationToken::new());
        assert!(apply_revision(&mut ctx.document, &entry("Dev", "Forge"), "A forge"));

        let items = &ctx.document.0[0].items;
        assert_eq!(items[0].description, "A forge");
        assert_eq!(items[1].description, "");
    }

    #[test]
    fn test_apply_revision_without_match_is_noop() {
        let mut ctx = context(CancellationToken::new());
        let before = ctx.document.clone();

        assert!(!apply_revision(&mut ctx.document, &entry("Dev", "Daily"), "x"));
        assert!(!apply_revision(&mut ctx.document, &entry("Gone", "Forge"), "x"));
        assert_eq!(ctx.document, before);
    }

    #[tokio::test]
    async fn test_revise_applies_answers_in_order() {
        let mut ctx = context(CancellationToken::new());
        let mut prompter = ScriptedPrompter::new(&[
            Some("  Self-hosted git  \n"),
            Some(""),
            Some("Morning news"),
        ]);

        let mut finished_with = None;
        let report = revise(&mut ctx, &mut prompter, |ctx, report| {
            finished_with = Some(ctx.document.clone());
            report
        })
        .await
        .unwrap();

        assert_eq!(prompter.asked, vec!["Forge", "Wiki", "Daily"]);
        assert_eq!(
            prompter.revised,
            vec![
                ("Forge".to_string(), 1, 3),
                ("Wiki".to_string(), 2, 3),
                ("Daily".to_string(), 3, 3),
            ]
        );
        assert_eq!(report.status, ReviseStatus::Completed);
        assert_eq!(report.applied, 3);
        assert_eq!(report.remaining, vec![entry("Dev", "Wiki")]);

        let doc = finished_with.expect("callback ran");
        assert_eq!(doc.find_item("Dev", "Forge").unwrap().description, "Self-hosted git");
        assert_eq!(doc.find_item("News", "Daily").unwrap().description, "Morning news");
    }

    #[tokio::test]
    async fn test_revise_counts_unmatched_entries() {
        let mut ctx = context(CancellationToken::new());
        ctx.revise = vec![entry("Dev", "Renamed")];
        let before = ctx.document.clone();
        let mut prompter = ScriptedPrompter::new(&[Some("whatever")]);

        let report = revise(&mut ctx, &mut prompter, |_, report| report)
            .await
            .unwrap();

        assert_eq!(report.unmatched, 1);
        assert_eq!(report.applied, 0);
        assert_eq!(ctx.document, before);
    }

    #[tokio::test]
    async fn test_revise_stops_on_closed_input() {
        let mut ctx = context(CancellationToken::new());
        let mut prompter = ScriptedPrompter::new(&[Some("Self-hosted git"), None]);

        let report = revise(&mut ctx, &mut prompter, |_, report| report)
            .await
            .unwrap();

        assert_eq!(report.status, ReviseStatus::Cancelled);
        assert_eq!(report.applied, 1);
        assert_eq!(
            report.remaining,
            vec![entry("Dev", "Wiki"), entry("News", "Daily")]
        );
    }

    #[tokio::test]
    async fn test_revise_cancelled_during_prompt_drops_answer() {
        let token = CancellationToken::new();
        let mut ctx = context(token.clone());
        let mut prompter = ScriptedPrompter::new(&[Some("too late")]);
        prompter.cancel_after_ask = Some(token);

        let mut called = false;
        let report = revise(&mut ctx, &mut prompter, |_, report| {
            called = true;
            report
        })
        .await
        .unwrap();

        assert!(called);
        assert_eq!(report.status, ReviseStatus::Cancelled);
        assert_eq!(report.applied, 0);
        assert_eq!(prompter.asked.len(), 1);
        assert_eq!(ctx.document.find_item("Dev", "Forge").unwrap().description, "");
    }

    #[tokio::test]
    async fn test_revise_with_empty_list_completes_immediately() {
        let mut ctx = context(CancellationToken::new()).with_revise_list(Vec::new());
        let mut prompter = ScriptedPrompter::new(&[]);

        let report = revise(&mut ctx, &mut prompter, |_, report| report)
            .await
            .unwrap();

        assert_eq!(report.status, ReviseStatus::Completed);
        assert!(prompter.asked.is_empty());
    }
}
