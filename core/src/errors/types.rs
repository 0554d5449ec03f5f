//! Authentication errors raised by flows that gate on a verified passcode
//!
//! Registration, login and password reset are orchestrated outside the
//! passcode engine. They turn a rejected verification into one of these
//! errors and stop before creating an account or a session.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("OTP not found")]
    OtpNotFound,

    #[error("OTP has expired")]
    OtpExpired,

    #[error("Too many incorrect attempts")]
    TooManyAttempts,

    #[error("Invalid OTP. {remaining} attempts remaining")]
    InvalidOtp { remaining: u32 },
}
