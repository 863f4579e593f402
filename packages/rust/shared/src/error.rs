//! Error types for docsetgen.
//!
//! Library crates use [`DocsetError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docsetgen operations.
#[derive(Debug, thiserror::Error)]
pub enum DocsetError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// An input the build relies on (page tree, catalog file) is absent.
    #[error("missing {what} at {path:?}")]
    MissingInput { path: PathBuf, what: String },

    /// The external renderer failed to convert a page.
    #[error("render error: {0}")]
    Render(String),

    /// Rendered HTML did not have the shape the annotator requires.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Index database error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed catalog, bad release identifier, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// An external program (tar, convert) could not be run or exited non-zero.
    #[error("command `{program}` failed: {message}")]
    Command { program: String, message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocsetError>;

impl DocsetError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Report a missing input collaborator.
    pub fn missing(path: impl Into<PathBuf>, what: impl Into<String>) -> Self {
        Self::MissingInput {
            path: path.into(),
            what: what.into(),
        }
    }

    /// Report a failed external command.
    pub fn command(program: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Command {
            program: program.into(),
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
