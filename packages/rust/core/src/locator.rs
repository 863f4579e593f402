//! Source page discovery.

use std::path::Path;

use tracing::{debug, instrument};
use walkdir::WalkDir;

use docsetgen_shared::{DocsetError, Page, Result};

/// Every file under `root` with the given extension, in a stable order.
///
/// Directories are visited depth-first with entries sorted by file name, so
/// two runs over the same tree produce the same sequence.
#[instrument(skip_all, fields(root = %root.display(), extension = %extension))]
pub fn locate_pages(root: &Path, extension: &str) -> Result<Vec<Page>> {
    if !root.is_dir() {
        return Err(DocsetError::missing(root, "page directory"));
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            DocsetError::io(path, source)
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| DocsetError::validation(format!("{} is outside the page root", entry.path().display())))?;
        pages.push(page_for(entry.path(), relative)?);
    }

    debug!(count = pages.len(), "pages located");
    Ok(pages)
}

/// Build a [`Page`] from its location relative to the page root.
///
/// The output path keeps the directory structure, uses `/` separators, and
/// swaps the extension for `.html`.
pub fn page_for(source: &Path, relative: &Path) -> Result<Page> {
    let basename = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| DocsetError::validation(format!("page {} has no usable name", source.display())))?
        .to_string();

    let mut segments: Vec<String> = Vec::new();
    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            let segment = component.as_os_str().to_str().ok_or_else(|| {
                DocsetError::validation(format!("page path {} is not UTF-8", source.display()))
            })?;
            segments.push(segment.to_string());
        }
    }
    segments.push(format!("{basename}.html"));

    Ok(Page {
        source: source.to_path_buf(),
        basename,
        output_path: segments.join("/"),
    })
}
