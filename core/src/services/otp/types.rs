//! Types for passcode service results

use serde::Serialize;

use crate::errors::AuthError;

/// Result of verifying a submitted code
///
/// Every variant is an expected branch of normal operation; infrastructure
/// failures travel separately as `DomainError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// Code matched; the issuance is now consumed
    Success,
    /// No live issuance for the key (never issued, swept, superseded or already consumed)
    NotFound,
    /// Issuance is past its expiry
    Expired,
    /// Attempt budget already spent
    TooManyAttempts,
    /// Wrong code; `remaining` failed attempts left before exhaustion
    Mismatch { remaining: u32 },
}

impl VerifyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, VerifyOutcome::Success)
    }

    /// Stable machine-readable tag
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyOutcome::Success => "success",
            VerifyOutcome::NotFound => "not_found",
            VerifyOutcome::Expired => "expired",
            VerifyOutcome::TooManyAttempts => "too_many_attempts",
            VerifyOutcome::Mismatch { .. } => "mismatch",
        }
    }

    /// Human-readable message for the caller
    pub fn message(&self) -> String {
        match self {
            VerifyOutcome::Success => "OTP verified successfully".to_string(),
            VerifyOutcome::NotFound => AuthError::OtpNotFound.to_string(),
            VerifyOutcome::Expired => AuthError::OtpExpired.to_string(),
            VerifyOutcome::TooManyAttempts => AuthError::TooManyAttempts.to_string(),
            VerifyOutcome::Mismatch { remaining } => {
                AuthError::InvalidOtp { remaining: *remaining }.to_string()
            }
        }
    }

    /// Remaining attempts, only meaningful after a mismatch
    pub fn remaining_attempts(&self) -> Option<u32> {
        match self {
            VerifyOutcome::Mismatch { remaining } => Some(*remaining),
            _ => None,
        }
    }

    /// Convert a rejection into the error a gating flow raises
    pub fn into_result(self) -> Result<(), AuthError> {
        match self {
            VerifyOutcome::Success => Ok(()),
            VerifyOutcome::NotFound => Err(AuthError::OtpNotFound),
            VerifyOutcome::Expired => Err(AuthError::OtpExpired),
            VerifyOutcome::TooManyAttempts => Err(AuthError::TooManyAttempts),
            VerifyOutcome::Mismatch { remaining } => Err(AuthError::InvalidOtp { remaining }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_outcomes() {
        assert_eq!(VerifyOutcome::Success.message(), "OTP verified successfully");
        assert_eq!(VerifyOutcome::Expired.message(), "OTP has expired");
        assert_eq!(
            VerifyOutcome::Mismatch { remaining: 4 }.message(),
            "Invalid OTP. 4 attempts remaining"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(VerifyOutcome::Mismatch { remaining: 2 }).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "mismatch", "remaining": 2}));

        let json = serde_json::to_value(VerifyOutcome::TooManyAttempts).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "too_many_attempts"}));
    }

    #[test]
    fn test_into_result() {
        assert!(VerifyOutcome::Success.into_result().is_ok());
        assert_eq!(
            VerifyOutcome::Mismatch { remaining: 0 }.into_result(),
            Err(AuthError::InvalidOtp { remaining: 0 })
        );
        assert_eq!(VerifyOutcome::NotFound.into_result(), Err(AuthError::OtpNotFound));
    }
}
