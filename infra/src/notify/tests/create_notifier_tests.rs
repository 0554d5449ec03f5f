//! Tests for notifier selection and email content

use jp_core::domain::entities::OtpPurpose;
use jp_core::services::Notifier;
use jp_shared::config::{EmailConfig, EmailProvider};

use crate::notify::{create_notifier, otp_email_content};

#[test]
fn test_mock_provider() {
    let notifier = create_notifier(&EmailConfig::default(), 10);
    assert_eq!(notifier.provider_name(), "mock");
}

#[test]
fn test_unconfigured_brevo_falls_back_to_mock() {
    let config = EmailConfig {
        provider: EmailProvider::Brevo,
        api_key: String::new(),
        ..Default::default()
    };

    assert_eq!(create_notifier(&config, 10).provider_name(), "mock");
}

#[test]
fn test_configured_brevo() {
    let config = EmailConfig {
        provider: EmailProvider::Brevo,
        api_key: "xkeysib-test".to_string(),
        ..Default::default()
    };

    assert_eq!(create_notifier(&config, 10).provider_name(), "brevo");
}

#[test]
fn test_email_content_per_purpose() {
    let registration = otp_email_content(OtpPurpose::Registration, "123456", 10);
    assert_eq!(registration.subject, "Verify Your Email - Job Portal");
    assert_eq!(
        registration.body,
        "Your registration verification code is: 123456\n\nThis code will expire in 10 minutes."
    );

    let reset = otp_email_content(OtpPurpose::PasswordReset, "000001", 15);
    assert_eq!(reset.subject, "Reset Your Password - Job Portal");
    assert!(reset.body.starts_with("Your password reset verification code is: 000001"));
    assert!(reset.body.ends_with("expire in 15 minutes."));

    let login = otp_email_content(OtpPurpose::Login, "999999", 10);
    assert_eq!(login.subject, "Login Verification - Job Portal");
}
