//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::article::Article;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ArticleStore, Storage, StorageError, StorageResult};
use crate::storage::{ArticleRecord, RunRecord};
use crate::NewsError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::Duration;

/// How long a writer waits on a lock held by another connection
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const ARTICLE_COLUMNS: &str =
    "id, grp, message_id, subject, posted_at, xrefs, headers, loaded_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

/// Article columns before the JSON ones are decoded
struct RawArticle {
    id: i64,
    group: String,
    message_id: String,
    subject: String,
    posted_at: i64,
    xrefs: String,
    headers: String,
    loaded_at: String,
}

impl RawArticle {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            group: row.get(1)?,
            message_id: row.get(2)?,
            subject: row.get(3)?,
            posted_at: row.get(4)?,
            xrefs: row.get(5)?,
            headers: row.get(6)?,
            loaded_at: row.get(7)?,
        })
    }

    fn decode(self) -> StorageResult<ArticleRecord> {
        Ok(ArticleRecord {
            id: self.id,
            group: self.group,
            message_id: self.message_id,
            subject: self.subject,
            posted_at: self.posted_at,
            xrefs: serde_json::from_str(&self.xrefs)?,
            headers: serde_json::from_str(&self.headers)?,
            loaded_at: self.loaded_at,
        })
    }
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Several instances may share one database file; each indexer owns its
    /// own connection.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(NewsError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, NewsError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, NewsError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn query_articles<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> StorageResult<Vec<ArticleRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let raw = stmt
            .query_map(params, RawArticle::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        raw.into_iter().map(RawArticle::decode).collect()
    }
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl ArticleStore for SqliteStorage {
    fn insert(&mut self, group: &str, article: &Article) -> StorageResult<()> {
        let xrefs = serde_json::to_string(&article.xrefs)?;
        let headers = serde_json::to_string(&article.header)?;
        let now = Utc::now().to_rfc3339();

        let result = self.conn.execute(
            "INSERT INTO articles (grp, message_id, subject, posted_at, xrefs, headers, loaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                group,
                article.message_id,
                article.subject,
                article.timestamp,
                xrefs,
                headers,
                now
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StorageError::DuplicateKey {
                group: group.to_string(),
                message_id: article.message_id.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str, groups: &[String]) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let groups = serde_json::to_string(groups)?;
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, groups) VALUES (?1, ?2, ?3)",
            params![now, config_hash, groups],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, started_at, config_hash, groups FROM runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, started_at, config_hash, groups)) => Ok(Some(RunRecord {
                id,
                started_at,
                config_hash,
                groups: serde_json::from_str(&groups)?,
            })),
            None => Ok(None),
        }
    }

    // ===== Article Queries =====

    fn get_article(&self, group: &str, message_id: &str) -> StorageResult<Option<ArticleRecord>> {
        let raw = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM articles WHERE grp = ?1 AND message_id = ?2",
                    ARTICLE_COLUMNS
                ),
                params![group, message_id],
                RawArticle::from_row,
            )
            .optional()?;

        raw.map(RawArticle::decode).transpose()
    }

    fn find_by_subject(
        &self,
        group: &str,
        pattern: &str,
        limit: usize,
    ) -> StorageResult<Vec<ArticleRecord>> {
        self.query_articles(
            &format!(
                "SELECT {} FROM articles
                 WHERE grp = ?1 AND subject LIKE '%' || ?2 || '%'
                 ORDER BY posted_at DESC, id DESC
                 LIMIT ?3",
                ARTICLE_COLUMNS
            ),
            params![group, pattern, limit as i64],
        )
    }

    fn count_articles(&self, group: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE grp = ?1",
            params![group],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn newest_timestamp(&self, group: &str) -> StorageResult<Option<i64>> {
        let newest: Option<i64> = self.conn.query_row(
            "SELECT MAX(posted_at) FROM articles WHERE grp = ?1",
            params![group],
            |row| row.get(0),
        )?;
        Ok(newest)
    }

    fn list_groups(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT grp FROM articles ORDER BY grp")?;
        let groups = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(groups)
    }
}
