//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::path::PathBuf;

use invoicepro_core::DEFAULT_NAMESPACE;

/// API server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// SQLite file backing the server's collections
    pub database_path: PathBuf,

    /// Name reported by `/api/test` and `/api/connection`
    pub database_name: String,

    /// Key namespace inside the database file
    pub namespace: String,

    /// Write the sample collections on first start
    pub seed_sample_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 3001,
            database_path: PathBuf::from("invoicepro-server.db"),
            database_name: "invoicepro".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            seed_sample_data: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();

        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?;
        }
        if let Some(path) = lookup("INVOICEPRO_SERVER_DB") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(name) = lookup("DB_NAME") {
            config.database_name = name;
        }
        if let Some(namespace) = lookup("INVOICEPRO_SERVER_NAMESPACE") {
            if namespace.is_empty() {
                return Err(ConfigError::InvalidValue("INVOICEPRO_SERVER_NAMESPACE".to_string()));
            }
            config.namespace = namespace;
        }
        if let Some(seed) = lookup("INVOICEPRO_SERVER_SEED") {
            config.seed_sample_data = matches!(seed.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 3001);
        assert_eq!(config.database_name, "invoicepro");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("INVOICEPRO_SERVER_DB", "/srv/invoices.db"),
            ("DB_NAME", "acme"),
            ("INVOICEPRO_SERVER_SEED", "true"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, PathBuf::from("/srv/invoices.db"));
        assert_eq!(config.database_name, "acme");
        assert!(config.seed_sample_data);
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for PORT");
    }
}
