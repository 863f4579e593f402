//! Settings documented in prose rather than as headings.
//!
//! These have no heading of their own, so they are registered against the
//! section that describes them once all pages are indexed.

use tracing::{debug, instrument};

use docsetgen_shared::{EntryKind, IndexEntry, Result};
use docsetgen_storage::IndexStore;

/// `(name, page, anchor)` for every curated setting.
pub const SUPPLEMENTARY_SETTINGS: &[(&str, &str, &str)] = &[
    ("Include", "configuration.html", "includingexcluding_files"),
    ("Exclude", "configuration.html", "includingexcluding_files"),
    ("TargetRubyVersion", "configuration.html", "setting_the_target_ruby_version"),
    ("StyleGuideBaseURL", "configuration.html", "setting_the_style_guide_url"),
    ("StyleGuide", "configuration.html", "setting_the_style_guide_url"),
    (
        "inherit_from",
        "configuration.html",
        "inheriting_from_another_configuration_file_in_the_project",
    ),
    (
        "inherit_gem",
        "configuration.html",
        "inheriting_configuration_from_a_dependency_gem",
    ),
    ("NewCops", "versioning.html", "pending_cops"),
    ("require", "extensions.html", "loading_extensions"),
    ("UseCache", "usage/caching.html", "enabling_and_disabling_the_cache"),
    ("CacheRootDirectory", "usage/caching.html", "cache_path"),
    ("MaxFilesInCache", "usage/caching.html", "cache_pruning"),
    ("Safe", "usage/auto_correct.html", "safe_auto_correct"),
    ("SafeAutoCorrect", "usage/auto_correct.html", "safe_auto_correct"),
];

/// The curated settings as index entries.
pub fn supplementary_entries() -> impl Iterator<Item = IndexEntry> {
    SUPPLEMENTARY_SETTINGS
        .iter()
        .map(|(name, page, anchor)| IndexEntry::new(*name, EntryKind::Setting, format!("{page}#{anchor}")))
}

/// Insert every curated setting; returns how many were new.
#[instrument(skip_all)]
pub async fn register_supplementary(store: &IndexStore) -> Result<usize> {
    let mut added = 0;
    for entry in supplementary_entries() {
        if store.insert_if_absent(&entry).await? {
            added += 1;
        }
    }
    debug!(added, "supplementary settings registered");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_settings() {
        let entries: Vec<IndexEntry> = supplementary_entries().collect();
        assert_eq!(entries.len(), SUPPLEMENTARY_SETTINGS.len());
        assert!(entries.iter().all(|e| e.kind == EntryKind::Setting));
        assert!(entries.contains(&IndexEntry::new(
            "NewCops",
            EntryKind::Setting,
            "versioning.html#pending_cops"
        )));
    }

    #[tokio::test]
    async fn registration_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::open(&dir.path().join("docSet.dsidx")).await.unwrap();

        assert_eq!(register_supplementary(&store).await.unwrap(), SUPPLEMENTARY_SETTINGS.len());
        assert_eq!(register_supplementary(&store).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), SUPPLEMENTARY_SETTINGS.len() as u64);
    }
}
