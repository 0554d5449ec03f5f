pub mod otp;

pub use jp_shared::errors::ErrorResponse;
pub use otp::{SendOtpRequest, SendOtpResponse, VerifyOtpRequest, VerifyOtpResponse};
