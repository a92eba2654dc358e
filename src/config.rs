//! Configuration management for the target router

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

/// Which store backs the target repository and the traffic counters
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Redis,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    /// Prepended to every key written by the service
    pub key_prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub redis: RedisConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables (with prefix TARGET_ROUTER_), e.g. TARGET_ROUTER_SERVER__PORT
            .add_source(
                Environment::with_prefix("TARGET_ROUTER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Override Redis URL from REDIS_URL env var if present
            .set_override_option("redis.url", env::var("REDIS_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Redis,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "router:".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_names() {
        let backend: StorageBackend = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(backend, StorageBackend::Memory);
        let backend: StorageBackend = serde_json::from_str("\"redis\"").unwrap();
        assert_eq!(backend, StorageBackend::Redis);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(StorageConfig::default().backend, StorageBackend::Redis);
        assert_eq!(RedisConfig::default().key_prefix, "router:");
        assert_eq!(ServerConfig::default().port, 8080);
    }
}
