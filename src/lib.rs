//! newsindex: an unattended NNTP header indexer
//!
//! This crate crawls newsgroups over a pool of long-lived NNTP connections,
//! normalizes each article's headers, and loads them into a deduplicating
//! SQLite store for later querying.

pub mod article;
pub mod client;
pub mod config;
pub mod indexer;
pub mod nntp;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for newsindex operations
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("NNTP error: {0}")]
    Nntp(#[from] nntp::NntpError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid server address: {0}")]
    InvalidAddr(String),
}

/// Result type alias for newsindex operations
pub type Result<T> = std::result::Result<T, NewsError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use article::{build_article, parse_posting_date, parse_xref, Article, CrossRef};
pub use client::ClientPool;
pub use config::Config;
pub use indexer::{Indexer, IndexerHandle};
pub use nntp::{GroupSnapshot, NntpConnection, NntpError};
