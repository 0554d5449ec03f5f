//! Passcode route handlers
//!
//! - `POST /api/v1/otp/send` issues a code and emails it
//! - `POST /api/v1/otp/verify` checks a submitted code

pub mod send;
pub mod verify;

use std::sync::Arc;

use jp_core::services::OtpService;

pub use send::send_otp;
pub use verify::verify_otp;

/// Application state that holds shared services
pub struct AppState {
    pub otp_service: Arc<OtpService>,
}
