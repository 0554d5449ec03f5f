//! Redis client implementation
//!
//! This module provides a Redis client with a shared multiplexed connection,
//! retry logic with exponential backoff, and the handful of primitives the
//! passcode store builds on.

use redis::{aio::MultiplexedConnection, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use jp_shared::config::CacheConfig;

use crate::InfrastructureError;

/// Boxed future returned by operations passed to `execute_with_retry`
pub type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis client with retry logic
///
/// Cloning is cheap; clones share the same multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
    /// Maximum number of attempts for operations
    max_retries: u32,
    /// Base delay between retries (exponential backoff)
    retry_delay_ms: u64,
}

impl RedisClient {
    /// Create a new Redis client
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Redis client or error
    ///
    /// # Example
    /// ```no_run
    /// use jp_shared::config::CacheConfig;
    /// use jp_infra::cache::RedisClient;
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let client = RedisClient::new(CacheConfig::new("redis://localhost:6379")).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        let max_retries = config.max_retries.max(1);
        Self::new_with_retry_config(config, max_retries, 100).await
    }

    /// Create a new Redis client with custom retry configuration
    pub async fn new_with_retry_config(
        config: CacheConfig,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        info!("Creating Redis client with URL: {}", mask_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connect_timeout = Duration::from_secs(config.connection_timeout.max(1));
        let connection =
            Self::create_connection_with_retry(client, max_retries, retry_delay_ms, connect_timeout).await?;

        info!("Redis client created successfully");

        Ok(Self {
            connection,
            config,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
        connect_timeout: Duration,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let result = match tokio::time::timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(result) => result,
                Err(_) => Err(RedisError::from(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "Redis connection timed out",
                ))),
            };

            match result {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 5 seconds
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Configuration this client was built from
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Execute a Redis operation with automatic retry logic
    ///
    /// Only transient failures (I/O, loading, TRYAGAIN) are retried, with
    /// exponential backoff capped at 5 seconds. Use only for operations that
    /// are safe to apply twice.
    pub async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        self.execute(operation, self.max_retries).await
    }

    /// Execute a Redis operation exactly once
    ///
    /// For writes that are not idempotent: a dropped reply may mean the write
    /// already landed, so the error is returned instead of replaying it.
    pub async fn execute_once<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        self.execute(operation, 1).await
    }

    async fn execute<F, T>(&self, operation: F, max_attempts: u32) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if should_retry(&e, attempts, max_attempts) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_attempts, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Redis operation failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

/// Check if a Redis error is retriable
///
/// Determines if an error is transient and the operation should be retried.
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError | redis::ErrorKind::BusyLoadingError | redis::ErrorKind::TryAgain
    )
}

/// Whether a failed call gets another try within its attempt budget
pub(crate) fn should_retry(error: &RedisError, attempts: u32, max_attempts: u32) -> bool {
    attempts < max_attempts && is_retriable_error(error)
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let (Some(at_pos), Some(proto_end)) = (url.rfind('@'), url.find("://")) {
        if at_pos > proto_end {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
