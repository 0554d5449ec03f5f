//! # Infrastructure Layer
//!
//! Concrete adapters behind the ports defined in `jp_core`:
//! - **Cache**: Redis client and the Redis-backed passcode store
//! - **Database**: MySQL connection pool and the MySQL-backed passcode store
//! - **Notify**: email delivery through Brevo, plus a logging mock
//!
//! `build_store` and `notify::create_notifier` pick the adapters from
//! configuration so the API binary never names a concrete type.

use std::sync::Arc;

use jp_core::errors::DomainError;
use jp_core::repositories::{InMemoryOtpStore, OtpStore};
use jp_shared::config::{AppConfig, StoreBackend};

/// Cache module - Redis client and passcode store
pub mod cache;

/// Database module - MySQL pool and passcode store
pub mod database;

/// Notify module - passcode email delivery
pub mod notify;

pub use cache::{RedisClient, RedisOtpStore};
pub use database::{DatabasePool, MySqlOtpStore};
pub use notify::{create_notifier, BrevoEmailNotifier, MockEmailNotifier};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Email delivery error
    #[error("Email delivery error: {0}")]
    Notify(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Database(_) | InfrastructureError::Cache(_) => DomainError::store(error),
            other => DomainError::Internal {
                message: other.to_string(),
            },
        }
    }
}

/// Build the passcode store selected by `otp.store`
///
/// Connects to Redis or MySQL as needed. The MySQL store creates its table
/// when `database.auto_migrate` is set.
pub async fn build_store(config: &AppConfig) -> Result<Arc<dyn OtpStore>, InfrastructureError> {
    match config.otp.store {
        StoreBackend::Memory => {
            tracing::warn!(
                event = "otp_store_selected",
                backend = "memory",
                "Using in-memory passcode store; records are lost on restart"
            );
            Ok(Arc::new(InMemoryOtpStore::new()))
        }
        StoreBackend::Redis => {
            let client = RedisClient::new(config.cache.clone()).await?;
            tracing::info!(event = "otp_store_selected", backend = "redis", "Using Redis passcode store");
            Ok(Arc::new(RedisOtpStore::new(client)))
        }
        StoreBackend::Mysql => {
            let pool = DatabasePool::new(&config.database).await?;
            let store = MySqlOtpStore::new(pool.pool().clone());
            if config.database.auto_migrate {
                store.ensure_schema().await?;
            }
            tracing::info!(event = "otp_store_selected", backend = "mysql", "Using MySQL passcode store");
            Ok(Arc::new(store))
        }
    }
}
