//! Core pipeline orchestration and domain logic for docsetgen.
//!
//! This crate ties together page discovery, rendering, annotation, indexing,
//! and distribution (catalog + archive) into one build (`build_docset`).

use std::path::Path;

use tracing::debug;

use docsetgen_shared::{DocsetError, Result};

pub mod assets;
pub mod catalog;
pub mod locator;
pub mod package;
pub mod pipeline;
pub mod supplementary;

pub use pipeline::{BuildReport, ProgressReporter, SilentProgress, build_docset};

/// Write `data` as pretty-printed JSON.
pub(crate) fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| DocsetError::validation(format!("JSON serialization failed: {e}")))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DocsetError::io(parent, e))?;
    }
    std::fs::write(path, json).map_err(|e| DocsetError::io(path, e))?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}
