//! Core pipeline and domain logic for markfill.
//!
//! This crate ties together loading, description lookup, interactive
//! revision, and writing into the end-to-end `enrich` workflow.

pub mod context;
pub mod enricher;
pub mod loader;
pub mod pipeline;
pub mod reviser;
pub mod writer;

pub use context::RunContext;
pub use enricher::{EnrichProgress, EnrichSummary, SilentProgress, enrich};
pub use pipeline::{RunConfig, RunOutcome, run_deferred_revision, run_enrichment};
pub use reviser::{Prompter, ReviseReport, ReviseStatus, apply_revision, revise};
