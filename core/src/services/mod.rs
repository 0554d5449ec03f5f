//! Business services containing domain logic and use cases.

pub mod otp;

// Re-export commonly used types
pub use otp::{
    Clock, ManualClock, SystemClock, Notifier,
    OtpService, OtpServiceConfig, VerifyOutcome,
    OtpCleanupService, OtpCleanupConfig, CleanupResult,
    generate_code,
};
