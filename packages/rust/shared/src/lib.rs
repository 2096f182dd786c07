//! Shared types, error model, and configuration for markfill.
//!
//! This crate is the foundation depended on by all other markfill crates.
//! It provides:
//! - [`MarkfillError`], the unified error type
//! - Domain types ([`BookmarkDocument`], [`Category`], [`Item`], [`ReviseEntry`])
//! - Configuration ([`AppConfig`], [`LookupConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FilesConfig, LookupConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{MarkfillError, Result};
pub use types::{BookmarkDocument, Category, Item, ReviseEntry};
