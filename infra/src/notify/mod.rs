//! Notify module - passcode email delivery
//!
//! Implementations of the `Notifier` port from `jp_core`:
//! - **Brevo**: transactional email over the Brevo HTTP API
//! - **Mock**: logs the message, for development and tests

mod brevo;
mod mock;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use jp_core::domain::entities::OtpPurpose;
use jp_core::services::Notifier;
use jp_shared::config::{EmailConfig, EmailProvider};

pub use brevo::BrevoEmailNotifier;
pub use mock::MockEmailNotifier;

/// Subject and plain-text body for a passcode email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpEmail {
    pub subject: String,
    pub body: String,
}

/// Render the email sent for `purpose`
pub fn otp_email_content(purpose: OtpPurpose, code: &str, ttl_minutes: i64) -> OtpEmail {
    let (subject, action) = match purpose {
        OtpPurpose::Registration => ("Verify Your Email - Job Portal", "registration"),
        OtpPurpose::Login => ("Login Verification - Job Portal", "login"),
        OtpPurpose::PasswordReset => ("Reset Your Password - Job Portal", "password reset"),
    };

    OtpEmail {
        subject: subject.to_string(),
        body: format!(
            "Your {} verification code is: {}\n\nThis code will expire in {} minutes.",
            action, code, ttl_minutes
        ),
    }
}

/// Create the notifier selected by configuration
///
/// Falls back to the mock notifier when Brevo is selected without an API key
/// or sender address, or when the HTTP client cannot be built.
pub fn create_notifier(config: &EmailConfig, ttl_minutes: i64) -> Arc<dyn Notifier> {
    match config.provider {
        EmailProvider::Mock => Arc::new(MockEmailNotifier::new(ttl_minutes)),
        EmailProvider::Brevo => {
            if !config.is_brevo_configured() {
                tracing::warn!(
                    event = "notifier_fallback",
                    "Brevo selected but BREVO_API_KEY or sender address is missing, using mock notifier"
                );
                return Arc::new(MockEmailNotifier::new(ttl_minutes));
            }

            match BrevoEmailNotifier::new(config, ttl_minutes) {
                Ok(notifier) => Arc::new(notifier),
                Err(e) => {
                    tracing::error!("Failed to initialize Brevo notifier: {}", e);
                    tracing::warn!(event = "notifier_fallback", "Falling back to mock notifier");
                    Arc::new(MockEmailNotifier::new(ttl_minutes))
                }
            }
        }
    }
}
