//! Periodic sweep of expired passcode records
//!
//! Expiry is already enforced at verification time; the sweep only bounds
//! storage growth.

use std::sync::Arc;
use tracing::{error, info, warn};

use jp_shared::config::OtpConfig;

use crate::errors::DomainError;
use crate::repositories::OtpStore;

use super::clock::{Clock, SystemClock};

/// Configuration for the passcode cleanup service
#[derive(Debug, Clone)]
pub struct OtpCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for OtpCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 300, // Run every 5 minutes
            enabled: true,
        }
    }
}

impl From<&OtpConfig> for OtpCleanupConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            interval_seconds: config.cleanup_interval_seconds,
            enabled: config.cleanup_enabled,
        }
    }
}

/// Service deleting records whose expiry has passed
pub struct OtpCleanupService {
    store: Arc<dyn OtpStore>,
    clock: Arc<dyn Clock>,
    config: OtpCleanupConfig,
}

impl OtpCleanupService {
    /// Create a new cleanup service running on the wall clock
    pub fn new(store: Arc<dyn OtpStore>, config: OtpCleanupConfig) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    /// Create a new cleanup service with an injected clock
    pub fn with_clock(store: Arc<dyn OtpStore>, clock: Arc<dyn Clock>, config: OtpCleanupConfig) -> Self {
        Self { store, clock, config }
    }

    /// Run a single cleanup cycle
    ///
    /// Deletes every record with `expires_at` strictly before the current
    /// instant. Safe to run concurrently with issuance and verification, and
    /// running it twice in a row removes nothing the second time.
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of the cycle
    /// * `Err(DomainError)` - If the store is unavailable
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let cutoff = self.clock.now();
        let expired_records_deleted = self.store.delete_expired_before(cutoff).await?;

        info!(
            deleted = expired_records_deleted,
            cutoff = %cutoff,
            event = "otp_cleanup_completed",
            "Passcode cleanup completed"
        );

        Ok(CleanupResult {
            expired_records_deleted,
        })
    }

    /// Start the cleanup service as a background task
    ///
    /// This spawns a tokio task that runs cleanup at regular intervals
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Passcode cleanup service is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                "Passcode cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_cleanup().await {
                    error!(error = %e, event = "otp_cleanup_failed", "Passcode cleanup cycle failed");
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupResult {
    /// Number of expired records deleted
    pub expired_records_deleted: u64,
}
