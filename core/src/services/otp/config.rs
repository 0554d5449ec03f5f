//! Configuration for the passcode service

use jp_shared::config::OtpConfig;

use crate::domain::entities::{CODE_LENGTH, DEFAULT_EXPIRATION_MINUTES, MAX_ATTEMPTS};

/// Configuration for the passcode service
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Number of digits in a generated code
    pub code_length: usize,
    /// Number of minutes before a code expires
    pub ttl_minutes: i64,
    /// Failed verifications allowed per issuance
    pub max_attempts: u32,
    /// Hand delivery to a spawned task instead of awaiting it
    pub background_delivery: bool,
    /// Upper bound for an inline delivery, in seconds
    pub delivery_timeout_secs: u64,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_length: CODE_LENGTH,
            ttl_minutes: DEFAULT_EXPIRATION_MINUTES,
            max_attempts: MAX_ATTEMPTS,
            background_delivery: true,
            delivery_timeout_secs: 10,
        }
    }
}

impl From<&OtpConfig> for OtpServiceConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            code_length: config.code_length,
            ttl_minutes: config.ttl_minutes,
            max_attempts: config.max_attempts,
            background_delivery: config.background_delivery,
            delivery_timeout_secs: config.delivery_timeout_secs,
        }
    }
}
