//! Configuration Module
//!
//! Handles loading and managing service and cache configuration from
//! environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Cache engine parameters.
///
/// Durations are milliseconds. Sizes are unsigned, so a negative capacity is
/// unrepresentable; zero values are rejected by [`CacheConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// TTL applied when `set` is called without one
    pub default_ttl: u64,
    /// Entry count the sweep evicts down to
    pub max_size: usize,
    /// Interval between background sweeps
    pub cleanup_interval: u64,
    /// Write the surviving entries to snapshot storage after each sweep
    pub enable_persistence: bool,
    /// Key the snapshot is stored under
    pub persistence_key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: 5 * 60 * 1000,
            max_size: 1000,
            cleanup_interval: 60 * 1000,
            enable_persistence: false,
            persistence_key: "dashboard_cache".to_string(),
        }
    }
}

impl CacheConfig {
    /// Rejects parameters the store cannot operate with.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be greater than zero".to_string(),
            ));
        }
        if self.default_ttl == 0 {
            return Err(CacheError::InvalidConfig(
                "default_ttl must be greater than zero".to_string(),
            ));
        }
        if self.cleanup_interval == 0 {
            return Err(CacheError::InvalidConfig(
                "cleanup_interval must be greater than zero".to_string(),
            ));
        }
        if self.enable_persistence && self.persistence_key.trim().is_empty() {
            return Err(CacheError::InvalidConfig(
                "persistence_key cannot be empty when persistence is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache engine parameters
    pub cache: CacheConfig,
    /// Directory holding file-backed snapshots
    pub snapshot_dir: PathBuf,
    /// Default page size for grids built by the service
    pub grid_page_size: usize,
    /// Base URL of the REST backend the resource services talk to
    pub api_base_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `CACHE_CLEANUP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 60000)
    /// - `CACHE_PERSISTENCE` - Enable snapshot persistence (default: false)
    /// - `CACHE_PERSISTENCE_KEY` - Snapshot key (default: dashboard_cache)
    /// - `CACHE_SNAPSHOT_DIR` - Snapshot directory (default: ./data)
    /// - `GRID_PAGE_SIZE` - Default grid page size (default: 10)
    /// - `API_BASE_URL` - REST backend base URL (default: http://localhost:8000/api)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cache: CacheConfig {
                default_ttl: env_or("CACHE_DEFAULT_TTL_MS", defaults.cache.default_ttl),
                max_size: env_or("CACHE_MAX_SIZE", defaults.cache.max_size),
                cleanup_interval: env_or(
                    "CACHE_CLEANUP_INTERVAL_MS",
                    defaults.cache.cleanup_interval,
                ),
                enable_persistence: env_or(
                    "CACHE_PERSISTENCE",
                    defaults.cache.enable_persistence,
                ),
                persistence_key: env::var("CACHE_PERSISTENCE_KEY")
                    .unwrap_or(defaults.cache.persistence_key),
            },
            snapshot_dir: env::var("CACHE_SNAPSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_dir),
            grid_page_size: env_or("GRID_PAGE_SIZE", defaults.grid_page_size),
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache: CacheConfig::default(),
            snapshot_dir: PathBuf::from("./data"),
            grid_page_size: 10,
            api_base_url: "http://localhost:8000/api".to_string(),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache.max_size, 1000);
        assert_eq!(config.cache.default_ttl, 300_000);
        assert_eq!(config.cache.cleanup_interval, 60_000);
        assert!(!config.cache.enable_persistence);
        assert_eq!(config.grid_page_size, 10);
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("SERVER_PORT");
        env::remove_var("CACHE_MAX_SIZE");
        env::remove_var("CACHE_DEFAULT_TTL_MS");
        env::remove_var("CACHE_CLEANUP_INTERVAL_MS");
        env::remove_var("CACHE_PERSISTENCE");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cache.max_size, 1000);
        assert_eq!(config.cache.default_ttl, 300_000);
        assert_eq!(config.cache.cleanup_interval, 60_000);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = CacheConfig {
            max_size: 0,
            ..CacheConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_blank_persistence_key() {
        let config = CacheConfig {
            enable_persistence: true,
            persistence_key: "  ".to_string(),
            ..CacheConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(CacheConfig::default().validate().is_ok());
    }
}
