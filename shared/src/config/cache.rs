//! Cache configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// Redis configuration for the Redis-backed passcode store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Connection timeout in seconds
    pub connection_timeout: u64,

    /// Retries for transient connection failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Key prefix shared by every passcode key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Seconds a record outlives its expiry before Redis evicts it.
    /// Keeps `Expired` distinguishable from `NotFound` until the next sweep.
    #[serde(default = "default_retention")]
    pub expired_retention_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            connection_timeout: 5,
            max_retries: default_max_retries(),
            key_prefix: default_key_prefix(),
            expired_retention_secs: default_retention(),
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_env_or(Self::default())
    }

    /// Override `base` with any `REDIS_*` variables that are set
    pub fn from_env_or(base: Self) -> Self {
        Self {
            url: env_or("REDIS_URL", base.url),
            connection_timeout: env_or("REDIS_CONNECTION_TIMEOUT", base.connection_timeout),
            max_retries: env_or("REDIS_MAX_RETRIES", base.max_retries),
            key_prefix: env_or("REDIS_KEY_PREFIX", base.key_prefix),
            expired_retention_secs: env_or("REDIS_EXPIRED_RETENTION_SECS", base.expired_retention_secs),
        }
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.key_prefix, key)
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_key_prefix() -> String {
    String::from("otp")
}

fn default_retention() -> u64 {
    3600 // 1 hour
}
