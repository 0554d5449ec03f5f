//! Domain-specific error types and error handling.

mod types;


// Re-export all error types
pub use types::AuthError;

use thiserror::Error;

/// Core domain errors (general purpose)
///
/// Verification outcomes (not found, expired, mismatch, exhausted) are values
/// of `VerifyOutcome`, never variants here. They only become an `Auth` error
/// when a caller asks for a hard gate through `OtpService::require_verified`.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid purpose: {purpose}")]
    InvalidPurpose { purpose: String },

    #[error("Passcode store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl DomainError {
    /// Wrap a backend failure as a store outage
    pub fn store(message: impl std::fmt::Display) -> Self {
        DomainError::StoreUnavailable {
            message: message.to_string(),
        }
    }

    /// Whether the caller may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::StoreUnavailable { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
