//! Configuration module for newsindex
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use newsindex::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("nonews.toml")).unwrap();
//! println!("Indexing {} groups from {}", config.index_groups().len(), config.addr());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, GroupConfig, IndexConfig, ServerConfig, StoreConfig, DEFAULT_CONNECTIONS,
    DEFAULT_GROUP_DELAY, DEFAULT_TIMEOUT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
