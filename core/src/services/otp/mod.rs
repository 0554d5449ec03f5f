//! One-time passcode service module for email-based authentication
//!
//! This module provides the complete passcode workflow including:
//! - Code generation from the operating system CSPRNG
//! - Issuance with supersession of the previous code for the same key
//! - Verification with expiry, sticky attempt exhaustion and single use
//! - Delivery through an injected notifier
//! - Periodic sweep of expired records

mod cleanup;
mod clock;
mod config;
mod generator;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, OtpCleanupConfig, OtpCleanupService};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::OtpServiceConfig;
pub use generator::generate_code;
pub use service::OtpService;
pub use traits::Notifier;
pub use types::VerifyOutcome;
