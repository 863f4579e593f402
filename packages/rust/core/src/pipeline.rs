//! End-to-end build: page tree → rendered, annotated bundle → archive + catalog.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use docsetgen_html::{RenderedDocument, Renderer, annotate};
use docsetgen_shared::{BuildContext, DocsetError, Page, Result};
use docsetgen_storage::IndexStore;

use crate::assets::{install_icons, write_bundle_assets};
use crate::catalog::{CATALOG_FILE, CatalogHeader, update_catalog};
use crate::locator::locate_pages;
use crate::package::{Packager, publish_archive};
use crate::supplementary::register_supplementary;

/// Result of one build run.
#[derive(Debug)]
pub struct BuildReport {
    /// Root of the `.docset` bundle.
    pub bundle_dir: PathBuf,
    /// Number of pages converted.
    pub page_count: usize,
    /// Rows this run added to the index.
    pub entries_added: usize,
    /// Rows in the index after the run.
    pub total_entries: u64,
    /// Whether the catalog gained a record for this version.
    pub catalog_updated: bool,
    /// Versioned archive copy, when the distribution root was present.
    pub archive: Option<PathBuf>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each page is written.
    fn page_converted(&self, path: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_converted(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &BuildReport) {}
}

/// Run the full build.
///
/// 1. Bundle assets (stylesheet, plist, meta)
/// 2. Locate pages
/// 3. Per page: render, decorate, annotate, index, write
/// 4. Register curated settings
/// 5. With a distribution root: icons, catalog merge, archive
#[instrument(skip_all, fields(version = %ctx.version, renderer = renderer.name()))]
pub async fn build_docset(
    ctx: &BuildContext,
    renderer: &dyn Renderer,
    packager: &dyn Packager,
    progress: &dyn ProgressReporter,
) -> Result<BuildReport> {
    let start = Instant::now();
    let bundle_dir = ctx.bundle_dir();
    info!(bundle = %bundle_dir.display(), "starting build");

    // --- Phase 1: Bundle skeleton ---
    if ctx.clean && bundle_dir.exists() {
        progress.phase("Removing previous bundle");
        std::fs::remove_dir_all(&bundle_dir).map_err(|e| DocsetError::io(&bundle_dir, e))?;
    }

    progress.phase("Writing bundle assets");
    write_bundle_assets(ctx)?;

    // --- Phase 2: Pages ---
    progress.phase("Locating pages");
    let pages = locate_pages(&ctx.pages_root, &ctx.source_extension)?;
    info!(count = pages.len(), "pages located");

    let store = IndexStore::open(&ctx.index_path()).await?;

    progress.phase("Converting pages");
    let total = pages.len();
    let mut entries_added = 0;
    for (i, page) in pages.iter().enumerate() {
        entries_added += convert_page(ctx, renderer, &store, page).await?;
        progress.page_converted(&page.output_path, i + 1, total);
    }

    // --- Phase 3: Curated settings ---
    progress.phase("Registering supplementary settings");
    entries_added += register_supplementary(&store).await?;
    let total_entries = store.count().await?;
    info!(entries_added, total_entries, "index complete");

    // --- Phase 4: Distribution ---
    let mut catalog_updated = false;
    let mut archive = None;
    if ctx.dash_root.is_dir() {
        progress.phase("Installing icons");
        install_icons(ctx);

        progress.phase("Updating catalog");
        let update = update_catalog(
            &ctx.dash_root.join(CATALOG_FILE),
            &CatalogHeader::from_context(ctx),
            &ctx.version,
        )?;
        catalog_updated = update.version_added;

        progress.phase("Packaging");
        archive = Some(publish_archive(ctx, packager)?);
    } else {
        info!(
            dash_root = %ctx.dash_root.display(),
            "distribution root not found, skipping icons, catalog and archive"
        );
    }

    let report = BuildReport {
        bundle_dir,
        page_count: total,
        entries_added,
        total_entries,
        catalog_updated,
        archive,
        elapsed: start.elapsed(),
    };

    info!(
        pages = report.page_count,
        entries = report.total_entries,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "build complete"
    );
    progress.done(&report);

    Ok(report)
}

/// Render one page into the bundle and index its headings.
///
/// Returns the number of rows added.
#[instrument(skip_all, fields(page = %page.output_path))]
async fn convert_page(
    ctx: &BuildContext,
    renderer: &dyn Renderer,
    store: &IndexStore,
    page: &Page,
) -> Result<usize> {
    let source = std::fs::read_to_string(&page.source).map_err(|e| DocsetError::io(&page.source, e))?;
    let html = renderer.render(&source)?;

    let mut doc = RenderedDocument::parse(&html);
    doc.decorate_head(
        &relative_to_page(&page.output_path, &ctx.links.icon_href),
        &relative_to_page(&page.output_path, &ctx.links.stylesheet),
    )?;
    doc.insert_online_comment(&ctx.online_url(&page.output_path))?;
    let entries = annotate(&mut doc, page)?;

    let target = ctx.documents_dir().join(&page.output_path);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DocsetError::io(parent, e))?;
    }
    std::fs::write(&target, doc.to_html()).map_err(|e| DocsetError::io(&target, e))?;

    let mut added = 0;
    for entry in &entries {
        if store.insert_if_absent(entry).await? {
            added += 1;
        }
    }
    debug!(entries = entries.len(), added, "page indexed");
    Ok(added)
}

/// Rewrite an href given relative to `Documents/` so it resolves from the page.
pub fn relative_to_page(output_path: &str, href: &str) -> String {
    if href.starts_with('/') || href.contains("://") {
        return href.to_string();
    }
    let depth = output_path.matches('/').count();
    format!("{}{href}", "../".repeat(depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hrefs_follow_page_depth() {
        assert_eq!(relative_to_page("index.html", "theme.css"), "theme.css");
        assert_eq!(relative_to_page("usage/caching.html", "theme.css"), "../theme.css");
        assert_eq!(
            relative_to_page("usage/caching.html", "../../../icon.png"),
            "../../../../icon.png"
        );
        assert_eq!(
            relative_to_page("a/b/c.html", "https://cdn.example/x.css"),
            "https://cdn.example/x.css"
        );
    }
}
