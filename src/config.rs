//! Configuration Module
//!
//! Per-namespace cache settings and the service configuration loaded from
//! environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

// == Cache Config ==
/// Settings for a single namespaced cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Prefix isolating this cache's keys
    pub namespace: String,
    /// TTL applied when `set` is called without one
    pub ttl: Duration,
    /// Hard cap on the number of entries
    pub max_size: usize,
}

impl CacheConfig {
    /// Creates a config with the given namespace and default limits.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// Sets the default TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the maximum number of entries.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// API responses (short lived)
    pub fn api() -> Self {
        Self {
            namespace: "api".to_string(),
            ttl: Duration::from_secs(2 * 60),
            max_size: 50,
        }
    }

    /// Derived UI values (filtering, sorting, grouping)
    pub fn ui() -> Self {
        Self {
            namespace: "ui".to_string(),
            ttl: Duration::from_secs(10 * 60),
            max_size: 100,
        }
    }

    /// Longer-lived domain data
    pub fn data() -> Self {
        Self {
            namespace: "data".to_string(),
            ttl: Duration::from_secs(5 * 60),
            max_size: 200,
        }
    }

    // == Validate ==
    /// Rejects settings the store cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(CacheError::InvalidConfig(
                "namespace cannot be empty".to_string(),
            ));
        }
        if self.namespace.contains(':') {
            return Err(CacheError::InvalidConfig(format!(
                "namespace '{}' cannot contain ':'",
                self.namespace
            )));
        }
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(format!(
                "max_size for '{}' must be at least 1",
                self.namespace
            )));
        }
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidConfig(format!(
                "ttl for '{}' must be greater than zero",
                self.namespace
            )));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            ttl: Duration::from_secs(5 * 60),
            max_size: 100,
        }
    }
}

// == Registry Config ==
/// Settings for the three namespaces owned by a `CacheRegistry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub api: CacheConfig,
    pub ui: CacheConfig,
    pub data: CacheConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            api: CacheConfig::api(),
            ui: CacheConfig::ui(),
            data: CacheConfig::data(),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache settings per namespace
    pub caches: RegistryConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 300)
    /// - `API_CACHE_TTL`, `UI_CACHE_TTL`, `DATA_CACHE_TTL` - default TTL in seconds
    /// - `API_CACHE_MAX_SIZE`, `UI_CACHE_MAX_SIZE`, `DATA_CACHE_MAX_SIZE` - entry caps
    pub fn from_env() -> Self {
        Self {
            caches: RegistryConfig {
                api: cache_from_env("API", CacheConfig::api()),
                ui: cache_from_env("UI", CacheConfig::ui()),
                data: cache_from_env("DATA", CacheConfig::data()),
            },
            server_port: env_or("SERVER_PORT", 3000),
            cleanup_interval: env_or("CLEANUP_INTERVAL", 300),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            caches: RegistryConfig::default(),
            server_port: 3000,
            cleanup_interval: 300,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn cache_from_env(prefix: &str, preset: CacheConfig) -> CacheConfig {
    let ttl = env_or(&format!("{prefix}_CACHE_TTL"), preset.ttl.as_secs());
    let max_size = env_or(&format!("{prefix}_CACHE_MAX_SIZE"), preset.max_size);
    preset
        .with_ttl(Duration::from_secs(ttl))
        .with_max_size(max_size)
}
