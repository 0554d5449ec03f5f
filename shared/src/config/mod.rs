//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `otp` - Passcode length, lifetime, attempt limits and store backend
//! - `email` - Delivery provider for passcode emails
//! - `cache` - Redis configuration for the Redis-backed store
//! - `database` - MySQL connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server configuration

pub mod cache;
pub mod database;
pub mod email;
pub mod environment;
pub mod otp;
pub mod server;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use email::{EmailConfig, EmailProvider};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::{OtpConfig, StoreBackend};
pub use server::ServerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Redis configuration
    pub cache: CacheConfig,

    /// One-time passcode configuration
    pub otp: OtpConfig,

    /// Email delivery configuration
    pub email: EmailConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            otp: OtpConfig::default(),
            email: EmailConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::new("127.0.0.1", 8000),
            database: DatabaseConfig::new("mysql://localhost:3306/job_portal_dev"),
            cache: CacheConfig::default(),
            otp: OtpConfig::default(),
            email: EmailConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::new("0.0.0.0", 8080),
            database: DatabaseConfig::new("mysql://prod-db:3306/job_portal")
                .with_max_connections(50),
            cache: CacheConfig::default(),
            otp: OtpConfig {
                store: StoreBackend::Redis,
                ..Default::default()
            },
            email: EmailConfig {
                provider: EmailProvider::Brevo,
                ..Default::default()
            },
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment
    ///
    /// Picks the preset for the detected environment, loads the matching
    /// `.env.<environment>` file (then `.env`) and lets environment variables
    /// override individual sections.
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        dotenvy::from_filename(env.env_file()).ok();
        dotenvy::dotenv().ok();

        let preset = match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::production();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        };

        Self {
            environment: env,
            server: ServerConfig::from_env_or(preset.server),
            database: DatabaseConfig::from_env_or(preset.database),
            cache: CacheConfig::from_env_or(preset.cache),
            otp: OtpConfig::from_env_or(preset.otp),
            email: EmailConfig::from_env_or(preset.email),
            logging: LoggingConfig::from_env_or(preset.logging),
        }
    }
}

/// Read an environment variable and parse it, keeping `fallback` when unset or malformed
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(fallback)
}
