//! libSQL storage for the docset search index (`docSet.dsidx`).
//!
//! The [`IndexStore`] struct wraps the single `searchIndex` table the
//! documentation viewer queries. Rows are unique over `(name, type, path)` and
//! only ever added, so re-running a build against an existing index is a no-op.
//!
//! **Access rules:**
//! - the build pipeline: read-write (sole writer) via [`IndexStore::open`]
//! - inspection and tests: read-only via [`IndexStore::open_readonly`]

mod migrations;

use std::path::Path;

use docsetgen_shared::{DocsetError, EntryKind, IndexEntry, Result};
use libsql::{Connection, Database, params};

/// Handle on one index database file.
pub struct IndexStore {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl IndexStore {
    /// Open or create the index at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DocsetError::io(parent, e))?;
        }

        let (db, conn) = connect(path).await?;
        let store = Self {
            db,
            conn,
            readonly: false,
        };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Open an existing index at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DocsetError::missing(path, "index database"));
        }

        let (db, conn) = connect(path).await?;
        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.schema_version().await?;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        DocsetError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
                self.conn
                    .execute_batch(&format!("PRAGMA user_version = {}", migration.version))
                    .await
                    .map_err(|e| DocsetError::Storage(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Applied schema version, `0` for a fresh file.
    pub async fn schema_version(&self) -> Result<u32> {
        let mut rows = self
            .conn
            .query("PRAGMA user_version", params![])
            .await
            .map_err(|e| DocsetError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let version = row
                    .get::<i64>(0)
                    .map_err(|e| DocsetError::Storage(e.to_string()))?;
                Ok(u32::try_from(version).unwrap_or(0))
            }
            Ok(None) => Ok(0),
            Err(e) => Err(DocsetError::Storage(e.to_string())),
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(DocsetError::Storage(
                "index is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Entries
    // -----------------------------------------------------------------------

    /// Insert `entry` unless the same `(name, type, path)` is already present.
    ///
    /// Returns `true` when a row was added.
    pub async fn insert_if_absent(&self, entry: &IndexEntry) -> Result<bool> {
        self.check_writable()?;
        let changed = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO searchIndex (name, type, path) VALUES (?1, ?2, ?3)",
                params![
                    entry.name.as_str(),
                    entry.kind.as_str(),
                    entry.path.as_str()
                ],
            )
            .await
            .map_err(|e| DocsetError::Storage(e.to_string()))?;

        if changed == 0 {
            tracing::trace!(name = %entry.name, kind = %entry.kind, path = %entry.path, "entry already indexed");
        }
        Ok(changed > 0)
    }

    /// Number of rows in the index.
    pub async fn count(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM searchIndex", params![])
            .await
            .map_err(|e| DocsetError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count = row
                    .get::<i64>(0)
                    .map_err(|e| DocsetError::Storage(e.to_string()))?;
                Ok(u64::try_from(count).unwrap_or(0))
            }
            Ok(None) => Ok(0),
            Err(e) => Err(DocsetError::Storage(e.to_string())),
        }
    }

    /// All rows, in insertion order.
    pub async fn entries(&self) -> Result<Vec<IndexEntry>> {
        let mut rows = self
            .conn
            .query(
                "SELECT name, type, path FROM searchIndex ORDER BY id",
                params![],
            )
            .await
            .map_err(|e| DocsetError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DocsetError::Storage(e.to_string()))?
        {
            let name = row
                .get::<String>(0)
                .map_err(|e| DocsetError::Storage(e.to_string()))?;
            let kind: EntryKind = row
                .get::<String>(1)
                .map_err(|e| DocsetError::Storage(e.to_string()))?
                .parse()?;
            let path = row
                .get::<String>(2)
                .map_err(|e| DocsetError::Storage(e.to_string()))?;
            results.push(IndexEntry { name, kind, path });
        }
        Ok(results)
    }
}

async fn connect(path: &Path) -> Result<(Database, Connection)> {
    let db = libsql::Builder::new_local(path)
        .build()
        .await
        .map_err(|e| DocsetError::Storage(e.to_string()))?;

    let conn = db
        .connect()
        .map_err(|e| DocsetError::Storage(e.to_string()))?;

    Ok((db, conn))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store(dir: &tempfile::TempDir) -> IndexStore {
        IndexStore::open(&dir.path().join("Resources").join("docSet.dsidx"))
            .await
            .expect("open test index")
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir).await;
        assert_eq!(store.schema_version().await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docSet.dsidx");

        let s1 = IndexStore::open(&path).await.expect("first open");
        s1.insert_if_absent(&IndexEntry::new("Basics", EntryKind::Guide, "index.html"))
            .await
            .unwrap();
        drop(s1);

        let s2 = IndexStore::open(&path).await.expect("second open");
        assert_eq!(s2.schema_version().await.unwrap(), 1);
        assert_eq!(s2.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_triples_are_absorbed() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir).await;

        let entry = IndexEntry::new("Line Length", EntryKind::Test, "cops_layout.html#linelength");
        assert!(store.insert_if_absent(&entry).await.unwrap());
        assert!(!store.insert_if_absent(&entry).await.unwrap());

        // Same name and path under a different kind is a distinct row.
        let other = IndexEntry::new("Line Length", EntryKind::Section, "cops_layout.html#linelength");
        assert!(store.insert_if_absent(&other).await.unwrap());

        assert_eq!(store.count().await.unwrap(), 2);
        let entries = store.entries().await.unwrap();
        assert_eq!(entries, vec![entry, other]);
    }

    #[tokio::test]
    async fn readonly_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docSet.dsidx");
        drop(IndexStore::open(&path).await.unwrap());

        let ro = IndexStore::open_readonly(&path).await.expect("open readonly");
        let err = ro
            .insert_if_absent(&IndexEntry::new("Enabled", EntryKind::Setting, "configuration.html#enabled"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("read-only"));
        assert_eq!(ro.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn readonly_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = IndexStore::open_readonly(&dir.path().join("absent.dsidx"))
            .await
            .err()
            .expect("missing file");
        assert!(matches!(err, DocsetError::MissingInput { .. }));
    }
}
