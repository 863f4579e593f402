//! Distribution catalog (`docset.json`) maintenance.

use std::path::Path;

use tracing::{debug, info, instrument};

use docsetgen_shared::{
    BuildContext, CatalogAuthor, CatalogVersion, DocsetCatalog, DocsetError, Result,
};

use crate::write_json;

/// Catalog file name inside the distribution root.
pub const CATALOG_FILE: &str = "docset.json";

/// Top-level catalog fields owned by this tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogHeader {
    pub name: String,
    pub archive: String,
    pub author: CatalogAuthor,
    pub aliases: Vec<String>,
}

impl CatalogHeader {
    pub fn from_context(ctx: &BuildContext) -> Self {
        Self {
            name: ctx.docset.name.clone(),
            archive: ctx.docset.archive.clone(),
            author: ctx.author(),
            aliases: ctx.catalog.aliases.clone(),
        }
    }
}

/// Outcome of [`update_catalog`].
#[derive(Debug, Clone)]
pub struct CatalogUpdate {
    /// Catalog as written.
    pub catalog: DocsetCatalog,
    /// Whether `specific_versions` gained a record.
    pub version_added: bool,
}

/// Archive location of `version` relative to the distribution root.
pub fn versioned_archive(version: &str, archive_name: &str) -> String {
    format!("versions/{version}/{archive_name}")
}

/// Put `version` at the head of `specific_versions` unless it is already listed.
///
/// Returns `true` when the list changed.
pub fn merge_version(catalog: &mut DocsetCatalog, version: &str, archive_name: &str) -> bool {
    if catalog.specific_versions.iter().any(|v| v.version == version) {
        return false;
    }
    catalog.specific_versions.insert(
        0,
        CatalogVersion {
            version: version.to_string(),
            archive: versioned_archive(version, archive_name),
        },
    );
    true
}

/// Read the catalog at `path`, refresh its header, merge `version`, write it back.
#[instrument(skip_all, fields(path = %path.display(), version = %version))]
pub fn update_catalog(path: &Path, header: &CatalogHeader, version: &str) -> Result<CatalogUpdate> {
    if !path.is_file() {
        return Err(DocsetError::missing(path, "catalog"));
    }

    let content = std::fs::read_to_string(path).map_err(|e| DocsetError::io(path, e))?;
    let mut catalog: DocsetCatalog = serde_json::from_str(&content).map_err(|e| {
        DocsetError::validation(format!("malformed catalog {}: {e}", path.display()))
    })?;

    catalog.name = header.name.clone();
    catalog.version = version.to_string();
    catalog.archive = header.archive.clone();
    catalog.author = header.author.clone();
    catalog.aliases = header.aliases.clone();

    let version_added = merge_version(&mut catalog, version, &header.archive);
    if version_added {
        info!(version, "version added to catalog");
    } else {
        debug!(version, "version already in catalog");
    }

    write_json(path, &catalog)?;
    Ok(CatalogUpdate {
        catalog,
        version_added,
    })
}
