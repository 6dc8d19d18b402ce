use crate::config::types::{Config, GroupConfig, ServerConfig, StoreConfig};
use crate::ConfigError;
use std::collections::{HashMap, HashSet};

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_store_config(&config.store)?;
    validate_index_groups(&config.index.groups)?;
    validate_group_overrides(&config.groups)?;
    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.addr.is_empty() {
        return Err(ConfigError::Validation(
            "missing 'server.addr'".to_string(),
        ));
    }

    match config.addr.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {}
        _ => {
            return Err(ConfigError::InvalidAddr(format!(
                "expected host:port, got '{}'",
                config.addr
            )))
        }
    }

    if config.connections < 1 || config.connections > 64 {
        return Err(ConfigError::Validation(format!(
            "connections must be between 1 and 64, got {}",
            config.connections
        )));
    }

    if config.timeout == 0 {
        return Err(ConfigError::Validation(
            "timeout must be at least 1 second".to_string(),
        ));
    }

    if config.username().is_none() && config.password.as_deref().is_some_and(|p| !p.is_empty()) {
        tracing::warn!("server.password is set without server.username; it will be ignored");
    }

    Ok(())
}

/// Validates store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the list of groups to index
fn validate_index_groups(groups: &[String]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for group in groups {
        validate_group_name(group)?;
        if !seen.insert(group.as_str()) {
            return Err(ConfigError::Validation(format!(
                "group '{}' is listed more than once",
                group
            )));
        }
    }
    Ok(())
}

fn validate_group_overrides(groups: &HashMap<String, GroupConfig>) -> Result<(), ConfigError> {
    for (name, group) in groups {
        validate_group_name(name)?;
        if group.delay == Some(0) {
            return Err(ConfigError::Validation(format!(
                "delay for group '{}' must be at least 1 second",
                name
            )));
        }
    }
    Ok(())
}

/// Group names go on the wire as a single command argument
fn validate_group_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "group name cannot be empty".to_string(),
        ));
    }

    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "group name '{}' contains whitespace or control characters",
            name.escape_debug()
        )));
    }

    Ok(())
}
