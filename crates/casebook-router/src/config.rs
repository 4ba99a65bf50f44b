//! Configuration file parsing for the Router.
//!
//! Loads settings from TOML files: bind address, JWT secret, token expiry,
//! request timeout, store backend, retry policy and access overrides.

use casebook_gatekeeper::AccessConfig;
use casebook_service::RetryConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Router configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),
}

/// Router configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// JWT secret for verifying bearer tokens
    pub jwt_secret: String,

    /// Token expiry in seconds for issued tokens (default: 3600 = 1 hour)
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,

    /// Deadline applied to every request (default: 10 seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Document store backend
    #[serde(default)]
    pub store: StoreConfig,

    /// Compare-and-swap retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Access overrides
    #[serde(default)]
    pub access: AccessConfig,
}

/// Which document store to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Volatile in-process store
    #[default]
    Memory,
    /// SQLite database file
    Sqlite,
}

/// Store configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Backend kind
    #[serde(default)]
    pub backend: StoreBackend,

    /// Database path, required for `sqlite`
    #[serde(default)]
    pub path: Option<String>,
}

/// Default token expiry: 1 hour
fn default_token_expiry() -> u64 {
    3600
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl RouterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingField("jwt_secret".to_string()));
        }
        if self.store.backend == StoreBackend::Sqlite && self.store.path.is_none() {
            return Err(ConfigError::MissingField("store.path".to_string()));
        }
        Ok(())
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        RouterConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            jwt_secret: "test-secret-key-do-not-use-in-production".to_string(),
            token_expiry_secs: 3600,
            request_timeout_ms: default_request_timeout(),
            log_level: default_log_level(),
            store: StoreConfig::default(),
            retry: RetryConfig::default(),
            access: AccessConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Per-request deadline
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default_test_config();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.bind_port, 8080);
        assert_eq!(config.token_expiry_secs, 3600);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_bind_addr() {
        let config = RouterConfig::default_test_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            jwt_secret = "my-secret"
            token_expiry_secs = 7200
            log_level = "casebook=debug"

            [store]
            backend = "sqlite"
            path = "casebook.db"

            [retry]
            max_attempts = 6

            [access]
            administrators = ["chief@example.com"]
        "#;

        let config = RouterConfig::from_toml(toml).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.jwt_secret, "my-secret");
        assert_eq!(config.token_expiry_secs, 7200);
        assert_eq!(config.request_timeout_ms, 10_000);
        assert_eq!(config.log_level, "casebook=debug");
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.store.path.as_deref(), Some("casebook.db"));
        assert_eq!(config.retry.max_attempts, 6);
        assert_eq!(config.retry.base_delay_ms, 100);
        assert!(config.access.is_administrator("chief@example.com"));
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let toml = r#"
            bind_address = "127.0.0.1"
            bind_port = 8080
            jwt_secret = "s"
        "#;
        let config = RouterConfig::from_toml(toml).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_missing_secret() {
        let toml = r#"
            bind_address = "127.0.0.1"
            bind_port = 8080
            jwt_secret = ""
        "#;
        let err = RouterConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "jwt_secret"));
    }

    #[test]
    fn test_sqlite_requires_path() {
        let toml = r#"
            bind_address = "127.0.0.1"
            bind_port = 8080
            jwt_secret = "s"

            [store]
            backend = "sqlite"
        "#;
        let err = RouterConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "store.path"));
    }
}
