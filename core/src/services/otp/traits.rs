//! Delivery collaborator for issued passcodes

use async_trait::async_trait;

use crate::domain::entities::OtpPurpose;

/// Out-of-band delivery of a passcode (email in production)
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `code` to `identifier`
    ///
    /// # Returns
    /// * `Ok(String)` - Provider message id
    /// * `Err(String)` - Delivery failed; the service logs it and moves on
    async fn send(&self, identifier: &str, purpose: OtpPurpose, code: &str) -> Result<String, String>;

    /// Provider name used in logs
    fn provider_name(&self) -> &str;
}
