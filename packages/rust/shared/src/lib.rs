//! Shared types, error model, and configuration for docsetgen.
//!
//! This crate is the foundation depended on by all other docsetgen crates.
//! It provides:
//! - [`DocsetError`] — the unified error type
//! - Domain types ([`EntryKind`], [`IndexEntry`], [`Page`], [`DocsetCatalog`])
//! - Configuration ([`AppConfig`], [`BuildContext`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildContext, CONFIG_FILE_NAME, CatalogConfig, DocsetConfig, LinksConfig,
    PathsConfig, RendererConfig, load_config, load_config_from, normalize_release,
    online_version,
};
pub use error::{DocsetError, Result};
pub use types::{
    CATEGORY_PAGE_PREFIX, CatalogAuthor, CatalogVersion, DocsetCatalog, DocsetMeta, EntryKind,
    IndexEntry, Page,
};
