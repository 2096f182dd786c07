//! Console prompts and enrichment progress output.

use std::fmt::Display;
use std::io::{BufRead, Write};

use async_trait::async_trait;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use markfill_core::{EnrichProgress, EnrichSummary, Prompter};
use markfill_lookup::LookupFailure;
use markfill_shared::{MarkfillError, Result, ReviseEntry};

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// Whether an answer to the yes/no question accepts.
pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_uppercase().as_str(), "Y" | "YES")
}

/// Stdin-backed [`Prompter`].
///
/// Stdin is read on a dedicated thread so a pending prompt can be abandoned
/// when the run is cancelled.
pub(crate) struct ConsolePrompter {
    cancel: CancellationToken,
    lines: Option<mpsc::Receiver<String>>,
    decline: bool,
}

impl ConsolePrompter {
    pub(crate) fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            lines: None,
            decline: false,
        }
    }

    /// Answer "no" to the revise question without asking.
    pub(crate) fn declining(mut self, decline: bool) -> Self {
        self.decline = decline;
        self
    }

    async fn read_line(&mut self, prompt: impl Display) -> Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout()
            .flush()
            .map_err(|e| MarkfillError::Prompt(format!("cannot write prompt: {e}")))?;

        let lines = self.lines.get_or_insert_with(spawn_stdin_reader);
        let line = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            line = lines.recv() => line,
        };
        Ok(line)
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[async_trait]
impl Prompter for ConsolePrompter {
    async fn confirm_revision(&mut self, pending: usize) -> Result<Option<bool>> {
        let accepted = if self.decline {
            false
        } else {
            println!("{pending} website(s) still need a description.");
            let question =
                style("Would you like to manually fix the missing website data immediately? (Y/N) ")
                    .color256(202)
                    .bold();
            match self.read_line(question).await? {
                Some(answer) => is_yes(&answer),
                None => return Ok(None),
            }
        };

        if accepted {
            println!("{}", style("\nLet us guide you through the process step by step.").bold());
        } else {
            let message = concat!(
                "\nNevermind, you can also edit it later! ",
                "Here we are provisioning files for you."
            );
            println!("{}", style(message).bold());
        }
        Ok(Some(accepted))
    }

    async fn ask_description(
        &mut self,
        entry: &ReviseEntry,
        _position: usize,
        _total: usize,
    ) -> Result<Option<String>> {
        println!(
            "{}",
            style(format!(
                "\nRevising information of \"{}\", its link is \"{}\"...",
                entry.name, entry.link
            ))
            .bold()
        );
        let prompt = "  Please input the description (right-click your mouse to paste): ";
        let answer = self.read_line(style(prompt).blue().bright()).await?;
        if answer.is_none() {
            println!();
            println!(
                "{}",
                style("Input closed, the remaining entries were left unrevised.").yellow()
            );
        }
        Ok(answer)
    }

    fn revised(&mut self, entry: &ReviseEntry, position: usize, total: usize) {
        println!(
            "{}",
            style(format!(
                "→ Successfully changed information of \"{}\", \
                 {position} out of {total} revising tasks are finished.",
                entry.name
            ))
            .green()
        );
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Enrichment progress bar with one line per settled item.
pub(crate) struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    pub(crate) fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ");
        bar.set_style(style);
        Self { bar }
    }
}

impl EnrichProgress for CliProgress {
    fn item_started(&self, name: &str, current: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar
            .set_message(format!("Handling {current} of {total} website \"{name}\"..."));
    }

    fn item_described(&self, name: &str) {
        self.bar.println(
            style(format!("→ Successfully handled information of website \"{name}\"."))
                .green()
                .to_string(),
        );
        self.bar.inc(1);
    }

    fn item_needs_revision(&self, name: &str, reason: Option<&LookupFailure>) {
        let detail = match reason {
            Some(reason) => format!(" ({reason})"),
            None => String::new(),
        };
        self.bar.println(
            style(format!(
                "→ Failed to get description data of website \"{name}\" or it's empty.{detail}"
            ))
            .yellow()
            .to_string(),
        );
        self.bar.inc(1);
    }

    fn finished(&self, _summary: &EnrichSummary) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        for answer in ["y", "Y", "yes", "YES", "Yes", " yes \r"] {
            assert!(is_yes(answer), "{answer:?} should accept");
        }
        for answer in ["", "n", "no", "yeah", "y e s", "ok"] {
            assert!(!is_yes(answer), "{answer:?} should decline");
        }
    }

    #[tokio::test]
    async fn test_declining_prompter_never_reads_stdin() {
        let mut prompter = ConsolePrompter::new(CancellationToken::new()).declining(true);
        assert_eq!(prompter.confirm_revision(3).await.unwrap(), Some(false));
        assert!(prompter.lines.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_prompt_returns_none() {
        let token = CancellationToken::new();
        token.cancel();
        let mut prompter = ConsolePrompter::new(token);
        let entry = ReviseEntry {
            name: "Forge".into(),
            link: "https://forge.example".into(),
            category: "Dev".into(),
        };
        assert_eq!(prompter.ask_description(&entry, 1, 1).await.unwrap(), None);
    }
}
