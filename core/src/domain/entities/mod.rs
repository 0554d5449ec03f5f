//! Domain entities representing core business objects.

pub mod otp_record;

// Re-export commonly used types
pub use otp_record::{
    OtpPurpose, OtpRecord, OtpState,
    CODE_LENGTH, DEFAULT_EXPIRATION_MINUTES, MAX_ATTEMPTS,
};
