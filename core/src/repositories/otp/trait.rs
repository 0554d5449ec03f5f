//! Passcode store trait defining the persistence contract for `OtpRecord`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{OtpPurpose, OtpRecord};
use crate::errors::DomainError;

/// Repository trait for `OtpRecord` persistence
///
/// Records are keyed by `(identifier, purpose)` and at most one record exists
/// per key. Every backend failure is reported as
/// `DomainError::StoreUnavailable`.
///
/// # Concurrency
/// - `put` replaces the whole record at once; readers never see a mix of two
///   issuances.
/// - `record_failed_attempt` and `mark_verified` are conditional on the
///   issuance id, so an operation aimed at a superseded record is a no-op.
///   They also refuse a record that expired before `now`.
/// - Two concurrent failed attempts on one record both land; two concurrent
///   successes on one record cannot both land.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Upsert a record, replacing whatever is stored for its key
    async fn put(&self, record: &OtpRecord) -> Result<(), DomainError>;

    /// Fetch the record for a key
    ///
    /// # Returns
    /// * `Ok(Some(OtpRecord))` - Record found, in whatever state it is in
    /// * `Ok(None)` - Nothing stored for the key
    async fn get(&self, identifier: &str, purpose: OtpPurpose) -> Result<Option<OtpRecord>, DomainError>;

    /// Remove the record for a key
    ///
    /// # Returns
    /// * `Ok(true)` - A record was removed
    /// * `Ok(false)` - Nothing was stored
    async fn delete(&self, identifier: &str, purpose: OtpPurpose) -> Result<bool, DomainError>;

    /// Remove every record whose `expires_at` is strictly before `cutoff`
    ///
    /// The comparison is made against the record present at sweep time, so a
    /// record re-issued with a later expiry is left alone.
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of records removed
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;

    /// Atomically count one failed verification
    ///
    /// Increments `attempts` only when the stored record still carries
    /// `record_id`, is not verified, has `attempts < max_attempts` and has
    /// `expires_at >= now`.
    ///
    /// # Returns
    /// * `Ok(Some(u32))` - The new attempt count
    /// * `Ok(None)` - Nothing was incremented (gone, superseded, verified, exhausted or expired)
    async fn record_failed_attempt(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
        record_id: Uuid,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<u32>, DomainError>;

    /// Atomically move a record from Active to Verified
    ///
    /// Same conditions as `record_failed_attempt`.
    ///
    /// # Returns
    /// * `Ok(true)` - This call performed the transition
    /// * `Ok(false)` - The record was gone, superseded, already verified, exhausted or expired
    async fn mark_verified(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
        record_id: Uuid,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;
}
