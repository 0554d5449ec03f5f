//! # Job Portal Core
//!
//! Core domain layer for the job portal backend.
//! This crate contains the one-time passcode entity, the store contract and its
//! in-memory implementation, the issuance/verification engine, and the error
//! types that form the foundation of the application architecture.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::entities::{OtpPurpose, OtpRecord, OtpState};
pub use errors::{AuthError, DomainError, DomainResult};
pub use repositories::{InMemoryOtpStore, OtpStore};
pub use services::{
    Clock, ManualClock, Notifier, OtpCleanupConfig, OtpCleanupService, OtpService,
    OtpServiceConfig, SystemClock, VerifyOutcome,
};
