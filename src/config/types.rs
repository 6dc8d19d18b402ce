use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Default polling delay between group selections (seconds)
pub const DEFAULT_GROUP_DELAY: u64 = 300;

/// Default number of pooled NNTP connections
pub const DEFAULT_CONNECTIONS: usize = 4;

/// Default per-command I/O timeout (seconds)
pub const DEFAULT_TIMEOUT: u64 = 60;

/// Main configuration structure for newsindex
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub index: IndexConfig,
    /// Per-group overrides, keyed by group name
    #[serde(default)]
    pub groups: HashMap<String, GroupConfig>,
}

/// NNTP server connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server address as `host:port`
    pub addr: String,

    /// Wrap connections in TLS
    #[serde(default)]
    pub tls: bool,

    /// Username for AUTHINFO; authentication is skipped when empty
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Number of long-lived connections in the client pool
    #[serde(default = "default_connections")]
    pub connections: usize,

    /// Per-command I/O timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Dedup store settings
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Which groups to index
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexConfig {
    #[serde(default)]
    pub groups: Vec<String>,
}

/// Per-group settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupConfig {
    /// Seconds to wait between polls of this group
    pub delay: Option<u64>,
}

fn default_connections() -> usize {
    DEFAULT_CONNECTIONS
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT
}

impl ServerConfig {
    /// Host part of `addr`, used as the TLS server name
    pub fn host(&self) -> &str {
        let host = match self.addr.rsplit_once(':') {
            Some((host, _port)) => host,
            None => &self.addr,
        };
        host.trim_start_matches('[').trim_end_matches(']')
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or("")
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Config {
    pub fn addr(&self) -> &str {
        &self.server.addr
    }

    pub fn tls(&self) -> bool {
        self.server.tls
    }

    pub fn username(&self) -> Option<&str> {
        self.server.username()
    }

    pub fn password(&self) -> &str {
        self.server.password()
    }

    pub fn database_path(&self) -> &str {
        &self.store.database_path
    }

    pub fn index_groups(&self) -> &[String] {
        &self.index.groups
    }

    /// Polling delay for a group, falling back to [`DEFAULT_GROUP_DELAY`]
    pub fn group_delay(&self, group: &str) -> Duration {
        let seconds = self
            .groups
            .get(group)
            .and_then(|g| g.delay)
            .unwrap_or(DEFAULT_GROUP_DELAY);
        tracing::trace!(group, seconds, "group delay");
        Duration::from_secs(seconds)
    }
}
