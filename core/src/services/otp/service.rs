//! Passcode issuance and verification engine

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use std::sync::Arc;

use jp_shared::utils::{mask_identifier, normalize_identifier};

use crate::domain::entities::{OtpPurpose, OtpRecord, OtpState};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::OtpStore;

use super::clock::{Clock, SystemClock};
use super::config::OtpServiceConfig;
use super::generator::generate_code;
use super::traits::Notifier;
use super::types::VerifyOutcome;

/// Issues and verifies one-time passcodes keyed by `(identifier, purpose)`
///
/// The service keeps no mutable state of its own; any number of instances can
/// share one store.
pub struct OtpService {
    /// Record persistence
    store: Arc<dyn OtpStore>,
    /// Out-of-band delivery
    notifier: Arc<dyn Notifier>,
    /// Time source
    clock: Arc<dyn Clock>,
    /// Service configuration
    config: OtpServiceConfig,
}

impl OtpService {
    /// Create a new passcode service running on the wall clock
    pub fn new(
        store: Arc<dyn OtpStore>,
        notifier: Arc<dyn Notifier>,
        config: OtpServiceConfig,
    ) -> Self {
        Self::with_clock(store, notifier, Arc::new(SystemClock), config)
    }

    /// Create a new passcode service with an injected clock
    pub fn with_clock(
        store: Arc<dyn OtpStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: OtpServiceConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    /// Issue a fresh passcode, superseding any previous one for the key
    ///
    /// This method:
    /// 1. Parses the purpose (no store access on failure)
    /// 2. Normalizes the identifier
    /// 3. Generates a code and stores the record, replacing the old one
    /// 4. Hands the code to the notifier
    ///
    /// Delivery failures are logged and never fail the issuance; the caller
    /// recovers by issuing again.
    ///
    /// # Returns
    ///
    /// * `Ok(OtpRecord)` - The stored record. Transports must not echo its code.
    /// * `Err(DomainError)` - Invalid purpose, empty identifier or store outage
    pub async fn issue(&self, identifier: &str, purpose: &str) -> DomainResult<OtpRecord> {
        let purpose: OtpPurpose = purpose.parse()?;
        let identifier = Self::normalize(identifier)?;

        let record = OtpRecord::new(
            identifier,
            purpose,
            generate_code(self.config.code_length),
            self.clock.now(),
            Duration::minutes(self.config.ttl_minutes),
        );

        self.store.put(&record).await.map_err(|e| {
            tracing::error!(
                identifier = %mask_identifier(&record.identifier),
                purpose = %purpose,
                error = %e,
                event = "otp_storage_failed",
                "Failed to store passcode"
            );
            e
        })?;

        tracing::info!(
            identifier = %mask_identifier(&record.identifier),
            purpose = %purpose,
            record_id = %record.id,
            expires_at = %record.expires_at,
            event = "otp_issued",
            "Issued new passcode"
        );

        self.dispatch(&record).await;

        Ok(record)
    }

    /// Verify a submitted code against the live issuance for the key
    ///
    /// Rejections are returned as `VerifyOutcome` values. Only an invalid
    /// purpose or a store outage produce an error.
    pub async fn verify(&self, identifier: &str, purpose: &str, code: &str) -> DomainResult<VerifyOutcome> {
        let purpose: OtpPurpose = purpose.parse()?;
        let identifier = Self::normalize(identifier)?;
        let max_attempts = self.config.max_attempts;

        let now = self.clock.now();
        let record = self.store.get(&identifier, purpose).await?;

        let record = match record {
            Some(record) => record,
            None => return Ok(self.finish(&identifier, purpose, VerifyOutcome::NotFound)),
        };

        if let Some(rejection) = Self::reject(&record, now, max_attempts) {
            return Ok(self.finish(&identifier, purpose, rejection));
        }

        let outcome = if constant_time_eq(record.code.as_bytes(), code.as_bytes()) {
            if self
                .store
                .mark_verified(&identifier, purpose, record.id, max_attempts, self.clock.now())
                .await?
            {
                VerifyOutcome::Success
            } else {
                self.reclassify(&identifier, purpose, &record).await?
            }
        } else {
            match self
                .store
                .record_failed_attempt(&identifier, purpose, record.id, max_attempts, self.clock.now())
                .await?
            {
                Some(attempts) => VerifyOutcome::Mismatch {
                    remaining: max_attempts.saturating_sub(attempts),
                },
                None => self.reclassify(&identifier, purpose, &record).await?,
            }
        };

        Ok(self.finish(&identifier, purpose, outcome))
    }

    /// Verify and turn any rejection into `DomainError::Auth`
    ///
    /// Hook for registration, login and password-reset flows that must stop
    /// before creating an account or a session.
    pub async fn require_verified(&self, identifier: &str, purpose: &str, code: &str) -> DomainResult<()> {
        self.verify(identifier, purpose, code)
            .await?
            .into_result()
            .map_err(DomainError::from)
    }

    /// Drop the live issuance for a key, if any
    pub async fn revoke(&self, identifier: &str, purpose: &str) -> DomainResult<bool> {
        let purpose: OtpPurpose = purpose.parse()?;
        let identifier = Self::normalize(identifier)?;
        self.store.delete(&identifier, purpose).await
    }

    fn normalize(identifier: &str) -> DomainResult<String> {
        let identifier = normalize_identifier(identifier);
        if identifier.is_empty() {
            return Err(DomainError::Validation {
                message: "Identifier must not be empty".to_string(),
            });
        }
        Ok(identifier)
    }

    /// Outcome for a record that cannot accept a code, `None` when it is active
    fn reject(record: &OtpRecord, now: DateTime<Utc>, max_attempts: u32) -> Option<VerifyOutcome> {
        match record.state(now, max_attempts) {
            OtpState::Active => None,
            OtpState::Verified => Some(VerifyOutcome::NotFound),
            OtpState::Expired => Some(VerifyOutcome::Expired),
            OtpState::Exhausted => Some(VerifyOutcome::TooManyAttempts),
        }
    }

    /// The store refused a transition because the record changed underneath us
    ///
    /// A concurrent request exhausted or consumed it, or a new issuance
    /// replaced it. A replacement means the submitted code targeted an issuance
    /// that no longer exists.
    async fn reclassify(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
        seen: &OtpRecord,
    ) -> DomainResult<VerifyOutcome> {
        let current = self.store.get(identifier, purpose).await?;
        let now = self.clock.now();

        Ok(match current {
            Some(current) if current.id == seen.id => {
                Self::reject(&current, now, self.config.max_attempts).unwrap_or(VerifyOutcome::NotFound)
            }
            _ => VerifyOutcome::NotFound,
        })
    }

    fn finish(&self, identifier: &str, purpose: OtpPurpose, outcome: VerifyOutcome) -> VerifyOutcome {
        match outcome {
            VerifyOutcome::Success => tracing::info!(
                identifier = %mask_identifier(identifier),
                purpose = %purpose,
                event = "otp_verified_success",
                "Passcode verified"
            ),
            VerifyOutcome::Mismatch { remaining } => tracing::warn!(
                identifier = %mask_identifier(identifier),
                purpose = %purpose,
                remaining_attempts = remaining,
                event = "otp_verification_failed",
                "Passcode mismatch"
            ),
            VerifyOutcome::TooManyAttempts => tracing::warn!(
                identifier = %mask_identifier(identifier),
                purpose = %purpose,
                event = "max_attempts_exceeded",
                "Passcode attempts exhausted"
            ),
            rejected => tracing::info!(
                identifier = %mask_identifier(identifier),
                purpose = %purpose,
                outcome = rejected.as_str(),
                event = "otp_verification_rejected",
                "Passcode verification rejected"
            ),
        }
        outcome
    }

    /// Hand the code to the notifier, in the background or inline with a timeout
    async fn dispatch(&self, record: &OtpRecord) {
        let notifier = Arc::clone(&self.notifier);
        let identifier = record.identifier.clone();
        let purpose = record.purpose;
        let code = record.code.clone();
        let timeout = std::time::Duration::from_secs(self.config.delivery_timeout_secs);

        let delivery = async move {
            match tokio::time::timeout(timeout, notifier.send(&identifier, purpose, &code)).await {
                Ok(Ok(message_id)) => tracing::info!(
                    identifier = %mask_identifier(&identifier),
                    purpose = %purpose,
                    provider = notifier.provider_name(),
                    message_id = %message_id,
                    event = "otp_delivered",
                    "Passcode delivered"
                ),
                Ok(Err(e)) => tracing::error!(
                    identifier = %mask_identifier(&identifier),
                    purpose = %purpose,
                    provider = notifier.provider_name(),
                    error = %e,
                    event = "otp_delivery_failed",
                    "Passcode delivery failed"
                ),
                Err(_) => tracing::error!(
                    identifier = %mask_identifier(&identifier),
                    purpose = %purpose,
                    provider = notifier.provider_name(),
                    timeout_secs = timeout.as_secs(),
                    event = "otp_delivery_timeout",
                    "Passcode delivery timed out"
                ),
            }
        };

        if self.config.background_delivery {
            tokio::spawn(delivery);
        } else {
            delivery.await;
        }
    }
}
