//! Brevo transactional email notifier
//!
//! Sends passcode emails through `POST /v3/smtp/email`. Any 2xx status counts
//! as accepted; the returned `messageId` is handed back to the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use jp_core::domain::entities::OtpPurpose;
use jp_core::services::Notifier;
use jp_shared::config::EmailConfig;
use jp_shared::utils::mask_identifier;

use crate::InfrastructureError;

use super::otp_email_content;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BrevoEmailAddress {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BrevoSendEmailBody {
    pub sender: BrevoEmailAddress,
    pub to: Vec<BrevoEmailAddress>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailResponse {
    message_id: Option<String>,
}

/// Brevo email notifier
pub struct BrevoEmailNotifier {
    client: Client,
    api_url: String,
    api_key: String,
    sender_email: String,
    sender_name: Option<String>,
    ttl_minutes: i64,
}

impl BrevoEmailNotifier {
    /// Create a new Brevo notifier
    ///
    /// # Errors
    /// * `InfrastructureError::Config` - API key or sender address missing
    /// * `InfrastructureError::Http` - HTTP client could not be built
    pub fn new(config: &EmailConfig, ttl_minutes: i64) -> Result<Self, InfrastructureError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(InfrastructureError::Config("BREVO_API_KEY is required".to_string()));
        }

        let sender_email = config.sender_email.trim();
        if sender_email.is_empty() {
            return Err(InfrastructureError::Config(
                "EMAIL_SENDER_ADDRESS is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let sender_name = Some(config.sender_name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: api_key.to_string(),
            sender_email: sender_email.to_string(),
            sender_name,
            ttl_minutes,
        })
    }

    /// Build the request body for one passcode email
    pub(crate) fn build_body(&self, to: &str, purpose: OtpPurpose, code: &str) -> BrevoSendEmailBody {
        let email = otp_email_content(purpose, code, self.ttl_minutes);

        BrevoSendEmailBody {
            sender: BrevoEmailAddress {
                email: self.sender_email.clone(),
                name: self.sender_name.clone(),
            },
            to: vec![BrevoEmailAddress {
                email: to.to_string(),
                name: None,
            }],
            subject: email.subject,
            html_content: None,
            text_content: Some(email.body),
        }
    }

    async fn post(&self, body: &BrevoSendEmailBody) -> Result<String, InfrastructureError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(InfrastructureError::Notify(format!(
                "Brevo send failed (status={}): {}",
                status.as_u16(),
                text
            )));
        }

        // A 2xx without a parseable body still means the message was accepted
        let message_id = response
            .json::<BrevoSendEmailResponse>()
            .await
            .ok()
            .and_then(|parsed| parsed.message_id)
            .unwrap_or_default();

        Ok(message_id)
    }
}

#[async_trait]
impl Notifier for BrevoEmailNotifier {
    async fn send(&self, identifier: &str, purpose: OtpPurpose, code: &str) -> Result<String, String> {
        let body = self.build_body(identifier, purpose, code);

        self.post(&body).await.map_err(|e| {
            tracing::warn!(
                provider = "brevo",
                identifier = %mask_identifier(identifier),
                error = %e,
                "Brevo request failed"
            );
            e.to_string()
        })
    }

    fn provider_name(&self) -> &str {
        "brevo"
    }
}
