//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the newsindex database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track indexer runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    groups TEXT NOT NULL
);

-- One row per article per group; re-inserts are rejected by the UNIQUE key
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    grp TEXT NOT NULL,
    message_id TEXT NOT NULL,
    subject TEXT NOT NULL,
    posted_at INTEGER NOT NULL,
    xrefs TEXT NOT NULL,
    headers TEXT NOT NULL,
    loaded_at TEXT NOT NULL,
    UNIQUE(grp, message_id)
);

CREATE INDEX IF NOT EXISTS idx_articles_subject ON articles(subject);
CREATE INDEX IF NOT EXISTS idx_articles_posted_at ON articles(posted_at);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
