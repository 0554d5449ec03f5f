//! One-time passcode configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// Storage backend holding passcode records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process map, single instance only
    Memory,
    /// Redis hashes shared by every instance
    Redis,
    /// MySQL table shared by every instance
    Mysql,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            "mysql" | "database" | "db" => Ok(StoreBackend::Mysql),
            _ => Err(format!("Invalid OTP store backend: {}", s)),
        }
    }
}

/// Passcode issuance and verification settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Number of digits in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Minutes a code stays valid after issuance
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,

    /// Failed verifications allowed before a code is exhausted
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Deliver codes from a spawned task instead of inline
    #[serde(default = "default_background_delivery")]
    pub background_delivery: bool,

    /// Upper bound for a single delivery attempt in seconds
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_secs: u64,

    /// Run the periodic expiry sweep
    #[serde(default = "default_cleanup_enabled")]
    pub cleanup_enabled: bool,

    /// Seconds between expiry sweeps
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,

    /// Where records are kept
    #[serde(default = "default_store")]
    pub store: StoreBackend,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            ttl_minutes: default_ttl_minutes(),
            max_attempts: default_max_attempts(),
            background_delivery: default_background_delivery(),
            delivery_timeout_secs: default_delivery_timeout(),
            cleanup_enabled: default_cleanup_enabled(),
            cleanup_interval_seconds: default_cleanup_interval(),
            store: default_store(),
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_env_or(Self::default())
    }

    /// Override `base` with any `OTP_*` variables that are set
    pub fn from_env_or(base: Self) -> Self {
        Self {
            code_length: env_or("OTP_CODE_LENGTH", base.code_length),
            ttl_minutes: env_or("OTP_TTL_MINUTES", base.ttl_minutes),
            max_attempts: env_or("OTP_MAX_ATTEMPTS", base.max_attempts),
            background_delivery: env_or("OTP_BACKGROUND_DELIVERY", base.background_delivery),
            delivery_timeout_secs: env_or("OTP_DELIVERY_TIMEOUT_SECS", base.delivery_timeout_secs),
            cleanup_enabled: env_or("OTP_CLEANUP_ENABLED", base.cleanup_enabled),
            cleanup_interval_seconds: env_or("OTP_CLEANUP_INTERVAL_SECONDS", base.cleanup_interval_seconds),
            store: env_or("OTP_STORE", base.store),
        }
    }
}

fn default_code_length() -> usize {
    6
}

fn default_ttl_minutes() -> i64 {
    10
}

fn default_max_attempts() -> u32 {
    5
}

fn default_background_delivery() -> bool {
    true
}

fn default_delivery_timeout() -> u64 {
    10
}

fn default_cleanup_enabled() -> bool {
    true
}

fn default_cleanup_interval() -> u64 {
    300 // 5 minutes
}

fn default_store() -> StoreBackend {
    StoreBackend::Memory
}
