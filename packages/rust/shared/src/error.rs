//! Error types for markfill.
//!
//! Library crates use [`MarkfillError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all markfill operations.
#[derive(Debug, thiserror::Error)]
pub enum MarkfillError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// HTTP client construction error.
    #[error("network error: {0}")]
    Network(String),

    /// A bookmark or revise-needs document could not be parsed.
    #[error("malformed document {path:?}: {message}")]
    Document { path: PathBuf, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reading interactive input failed.
    #[error("prompt error: {0}")]
    Prompt(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MarkfillError>;

impl MarkfillError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a document error for the file at `path`.
    pub fn document(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Document {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = MarkfillError::config("endpoint is not a valid URL");
        assert_eq!(err.to_string(), "config error: endpoint is not a valid URL");

        let err = MarkfillError::document("input.yml", "expected a sequence");
        assert!(err.to_string().contains("input.yml"));
        assert!(err.to_string().contains("expected a sequence"));
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = MarkfillError::io("/tmp/missing.yml", source);
        assert!(err.to_string().contains("/tmp/missing.yml"));
        assert!(err.to_string().contains("gone"));
    }
}
