//! Shared utilities and common types for the job portal OTP service
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Error response structures and error codes
//! - Identifier utilities (normalization, masking, email validation)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, Environment, LogFormat, StoreBackend, EmailProvider,
    DatabaseConfig, CacheConfig, EmailConfig, OtpConfig,
    ServerConfig, LoggingConfig
};
pub use errors::{ErrorResponse, ApiResult, error_codes};
pub use utils::{identifier, validation};
pub use utils::{normalize_identifier, mask_identifier, is_valid_email};
