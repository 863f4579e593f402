//! Core domain types for docset bundles.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::DocsetError;

// ---------------------------------------------------------------------------
// EntryKind
// ---------------------------------------------------------------------------

/// Semantic kind of an index entry, stored verbatim in the `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Category,
    Guide,
    Section,
    Test,
    Setting,
}

impl EntryKind {
    /// All kinds, in declaration order.
    pub const ALL: [EntryKind; 5] = [
        Self::Category,
        Self::Guide,
        Self::Section,
        Self::Test,
        Self::Setting,
    ];

    /// Name as the viewer expects it in `searchIndex.type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Guide => "Guide",
            Self::Section => "Section",
            Self::Test => "Test",
            Self::Setting => "Setting",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntryKind {
    type Err = DocsetError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DocsetError::validation(format!("unknown entry kind `{s}`")))
    }
}

// ---------------------------------------------------------------------------
// IndexEntry
// ---------------------------------------------------------------------------

/// One named, typed, located reference point in the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    /// Display text shown by the viewer.
    pub name: String,
    pub kind: EntryKind,
    /// Path relative to `Documents/`, optionally with a `#fragment`.
    pub path: String,
}

impl IndexEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            path: path.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// Prefix marking pages that document a department of cops.
pub const CATEGORY_PAGE_PREFIX: &str = "cops_";

/// A source page discovered under the pages root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Location of the source file on disk.
    pub source: PathBuf,
    /// File name without extension.
    pub basename: String,
    /// Output location relative to `Documents/` (e.g. `usage/caching.html`).
    pub output_path: String,
}

impl Page {
    /// Whether this page lists cops rather than guide material.
    pub fn is_category_page(&self) -> bool {
        self.basename.starts_with(CATEGORY_PAGE_PREFIX)
    }
}

// ---------------------------------------------------------------------------
// Bundle metadata
// ---------------------------------------------------------------------------

/// The `meta.json` file stored at the root of the `.docset` bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsetMeta {
    pub name: String,
    pub version: String,
    pub title: String,
}

/// `author` block of the distribution catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAuthor {
    pub name: String,
    pub link: String,
}

/// One historical release listed in `specific_versions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogVersion {
    pub version: String,
    pub archive: String,
}

/// The distribution catalog (`docset.json`), most recent version first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocsetCatalog {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub archive: String,
    #[serde(default)]
    pub author: CatalogAuthor,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub specific_versions: Vec<CatalogVersion>,
    /// Fields this tool does not manage, kept as found.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
