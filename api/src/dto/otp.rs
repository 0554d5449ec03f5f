use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use jp_core::services::VerifyOutcome;
use jp_shared::utils::is_valid_email;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendOtpRequest {
    /// Email address the code is sent to; case and surrounding spaces are ignored
    #[validate(custom = "validate_email_identifier")]
    pub identifier: String,

    /// "registration", "login" or "password_reset"
    pub purpose: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(custom = "validate_email_identifier")]
    pub identifier: String,

    pub purpose: String,

    /// Submitted code. Any other shape than the issued one is a mismatch,
    /// so only the size is bounded here.
    #[validate(length(min = 1, max = 32))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOtpResponse {
    pub issued: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpResponse {
    pub outcome: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
}

impl From<VerifyOutcome> for VerifyOtpResponse {
    fn from(outcome: VerifyOutcome) -> Self {
        Self {
            outcome: outcome.as_str().to_string(),
            message: outcome.message(),
            remaining_attempts: outcome.remaining_attempts(),
        }
    }
}

fn validate_email_identifier(identifier: &str) -> Result<(), ValidationError> {
    if is_valid_email(identifier.trim()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("email");
        error.message = Some("Identifier must be a valid email address".into());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_request_validation() {
        let request = SendOtpRequest {
            identifier: "  Seeker@Example.com ".to_string(),
            purpose: "registration".to_string(),
        };
        assert!(request.validate().is_ok());

        let request = SendOtpRequest {
            identifier: "seeker.example.com".to_string(),
            purpose: "registration".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_verify_request_requires_code() {
        let request = VerifyOtpRequest {
            identifier: "seeker@example.com".to_string(),
            purpose: "login".to_string(),
            code: String::new(),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("code"));
    }

    #[test]
    fn test_verify_response_from_outcome() {
        let response = VerifyOtpResponse::from(VerifyOutcome::Mismatch { remaining: 3 });
        assert_eq!(response.outcome, "mismatch");
        assert_eq!(response.message, "Invalid OTP. 3 attempts remaining");
        assert_eq!(response.remaining_attempts, Some(3));

        let json = serde_json::to_value(VerifyOtpResponse::from(VerifyOutcome::Success)).unwrap();
        assert!(json.get("remaining_attempts").is_none());
    }
}
