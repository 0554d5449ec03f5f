//! Mock email notifier
//!
//! Logs passcode emails instead of sending them. Used in development and
//! whenever a real provider is not configured.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use jp_core::domain::entities::OtpPurpose;
use jp_core::services::Notifier;
use jp_shared::utils::{is_valid_email, mask_identifier};

use super::otp_email_content;

/// Mock notifier for development and testing
#[derive(Clone)]
pub struct MockEmailNotifier {
    /// Number of messages accepted
    message_count: Arc<AtomicU64>,
    /// Fail every send when set
    simulate_failure: Arc<AtomicBool>,
    /// Last code accepted per `(identifier, purpose)`
    last_codes: Arc<Mutex<HashMap<(String, OtpPurpose), String>>>,
    /// Validity window quoted in the body
    ttl_minutes: i64,
}

impl MockEmailNotifier {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            simulate_failure: Arc::new(AtomicBool::new(false)),
            last_codes: Arc::new(Mutex::new(HashMap::new())),
            ttl_minutes,
        }
    }

    /// Get the total number of messages sent
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Last code sent to `identifier` for `purpose`
    pub fn last_code(&self, identifier: &str, purpose: OtpPurpose) -> Option<String> {
        self.last_codes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&(identifier.to_string(), purpose))
            .cloned()
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for MockEmailNotifier {
    async fn send(&self, identifier: &str, purpose: OtpPurpose, code: &str) -> Result<String, String> {
        let masked = mask_identifier(identifier);

        if !is_valid_email(identifier) {
            return Err(format!("Invalid email address: {}", masked));
        }

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(provider = "mock", identifier = %masked, "Mock notifier simulating failure");
            return Err("Simulated email delivery failure".to_string());
        }

        let email = otp_email_content(purpose, code, self.ttl_minutes);
        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.last_codes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert((identifier.to_string(), purpose), code.to_string());

        // The code is only ever written out by the mock
        info!(
            target: "email_service",
            provider = "mock",
            identifier = %masked,
            purpose = %purpose,
            subject = %email.subject,
            code = %code,
            message_id = %message_id,
            message_number = count,
            "Mock passcode email"
        );

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
