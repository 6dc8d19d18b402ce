//! Storage module for persisting indexed articles
//!
//! This module handles all database operations for the indexer, including:
//! - SQLite database initialization and schema management
//! - Deduplicating article inserts
//! - Article lookups for reporting
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{ArticleStore, Storage, StorageError, StorageResult};

use crate::article::CrossRef;
use crate::nntp::HeaderMap;
use crate::NewsError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(NewsError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, NewsError> {
    SqliteStorage::new(path)
}

/// An article as stored in the database
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub id: i64,
    pub group: String,
    pub message_id: String,
    pub subject: String,
    /// Seconds since the Unix epoch
    pub posted_at: i64,
    pub xrefs: Vec<CrossRef>,
    pub headers: HeaderMap,
    pub loaded_at: String,
}

/// Represents an indexer run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub config_hash: String,
    pub groups: Vec<String>,
}
