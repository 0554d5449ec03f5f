//! Database module - MySQL implementations using SQLx
//!
//! This module provides:
//! - Connection pool management
//! - The MySQL-backed passcode store

pub mod connection;
pub mod mysql;

// Re-export commonly used types
pub use connection::DatabasePool;
pub use mysql::MySqlOtpStore;
