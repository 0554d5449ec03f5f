//! Email delivery configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// Email delivery provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    /// Log messages instead of sending them
    Mock,
    /// Brevo transactional email API
    Brevo,
}

impl std::str::FromStr for EmailProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" | "console" => Ok(EmailProvider::Mock),
            "brevo" | "sendinblue" => Ok(EmailProvider::Brevo),
            _ => Err(format!("Invalid email provider: {}", s)),
        }
    }
}

/// Email delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    /// Provider used for passcode emails
    #[serde(default = "default_provider")]
    pub provider: EmailProvider,

    /// Brevo API key
    #[serde(default)]
    pub api_key: String,

    /// Brevo transactional email endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Sender address
    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    /// Sender display name
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            api_url: default_api_url(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            timeout_secs: default_timeout(),
        }
    }
}

impl EmailConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_env_or(Self::default())
    }

    /// Override `base` with any `EMAIL_*` / `BREVO_*` variables that are set
    pub fn from_env_or(base: Self) -> Self {
        Self {
            provider: env_or("EMAIL_PROVIDER", base.provider),
            api_key: env_or("BREVO_API_KEY", base.api_key),
            api_url: env_or("BREVO_API_URL", base.api_url),
            sender_email: env_or("EMAIL_SENDER_ADDRESS", base.sender_email),
            sender_name: env_or("EMAIL_SENDER_NAME", base.sender_name),
            timeout_secs: env_or("EMAIL_TIMEOUT", base.timeout_secs),
        }
    }

    /// Whether the Brevo credentials are present
    pub fn is_brevo_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.sender_email.trim().is_empty()
    }
}

fn default_provider() -> EmailProvider {
    EmailProvider::Mock
}

fn default_api_url() -> String {
    String::from("https://api.brevo.com/v3/smtp/email")
}

fn default_sender_email() -> String {
    String::from("no-reply@jobportal.local")
}

fn default_sender_name() -> String {
    String::from("Job Portal")
}

fn default_timeout() -> u64 {
    60
}
