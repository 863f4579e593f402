//! SQL migration definitions for the docset index.
//!
//! Migrations are applied in order on database open. The applied version is
//! kept in `PRAGMA user_version` so the file carries no tables beyond what the
//! documentation viewer reads.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: searchIndex with unique (name, type, path)",
        sql: r#"
CREATE TABLE IF NOT EXISTS searchIndex (
    id   INTEGER PRIMARY KEY,
    name TEXT,
    type TEXT,
    path TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS anchor ON searchIndex (name, type, path);
"#,
    }]
}
