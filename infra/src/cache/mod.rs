//! Cache module for Redis-based passcode storage
//!
//! Provides the Redis client with retry logic and the `OtpStore`
//! implementation built on it.

pub mod otp_store;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use otp_store::RedisOtpStore;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use jp_shared::config::CacheConfig;
