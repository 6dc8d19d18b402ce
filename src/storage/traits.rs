//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::article::Article;
use crate::storage::{ArticleRecord, RunRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// The article is already stored for this group. Callers loading
    /// articles treat this as success.
    #[error("Article {message_id} already stored for {group}")]
    DuplicateKey { group: String, message_id: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// The write side the indexer needs: insert-if-absent keyed by group and
/// message id
pub trait ArticleStore {
    /// Stores `article` under `group`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Article stored
    /// * `Err(StorageError::DuplicateKey)` - Already stored for this group
    /// * `Err(_)` - Any other failure
    fn insert(&mut self, group: &str, article: &Article) -> StorageResult<()>;
}

/// Full storage backend: article inserts plus the queries used for
/// reporting and run tracking
pub trait Storage: ArticleStore {
    // ===== Run Management =====

    /// Records the start of an indexer run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `groups` - Groups this run indexes
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, groups: &[String]) -> StorageResult<i64>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Article Queries =====

    /// Looks up one article by message id
    fn get_article(&self, group: &str, message_id: &str) -> StorageResult<Option<ArticleRecord>>;

    /// Articles whose subject contains `pattern`, newest first
    fn find_by_subject(
        &self,
        group: &str,
        pattern: &str,
        limit: usize,
    ) -> StorageResult<Vec<ArticleRecord>>;

    /// Counts the articles stored for a group
    fn count_articles(&self, group: &str) -> StorageResult<u64>;

    /// Posting time of the newest article in a group
    fn newest_timestamp(&self, group: &str) -> StorageResult<Option<i64>>;

    /// Every group with at least one stored article
    fn list_groups(&self) -> StorageResult<Vec<String>>;
}
