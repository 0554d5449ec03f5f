//! In-process implementation of `OtpStore`
//!
//! Suitable for a single instance (development, tests). Multi-instance
//! deployments need the Redis or MySQL store from the infra crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entities::{OtpPurpose, OtpRecord};
use crate::errors::DomainError;

use super::r#trait::OtpStore;

type Key = (String, OtpPurpose);

/// Passcode store backed by a mutex-guarded map
///
/// A single lock serializes every operation, which is what makes the
/// conditional updates atomic.
pub struct InMemoryOtpStore {
    records: Mutex<HashMap<Key, OtpRecord>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryOtpStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Number of store operations performed so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of records currently held
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Make every subsequent operation fail with `StoreUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn enter(&self) -> Result<(), DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::store("in-memory store marked unavailable"));
        }
        Ok(())
    }

    fn key(identifier: &str, purpose: OtpPurpose) -> Key {
        (identifier.to_string(), purpose)
    }
}

impl Default for InMemoryOtpStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The record is still the targeted issuance and still accepts a transition
fn is_transition_allowed(record: &OtpRecord, record_id: Uuid, max_attempts: u32, now: DateTime<Utc>) -> bool {
    record.id == record_id && !record.verified && record.attempts < max_attempts && record.expires_at >= now
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(&self, record: &OtpRecord) -> Result<(), DomainError> {
        self.enter()?;
        let mut records = self.records.lock().await;
        records.insert(Self::key(&record.identifier, record.purpose), record.clone());
        Ok(())
    }

    async fn get(&self, identifier: &str, purpose: OtpPurpose) -> Result<Option<OtpRecord>, DomainError> {
        self.enter()?;
        let records = self.records.lock().await;
        Ok(records.get(&Self::key(identifier, purpose)).cloned())
    }

    async fn delete(&self, identifier: &str, purpose: OtpPurpose) -> Result<bool, DomainError> {
        self.enter()?;
        let mut records = self.records.lock().await;
        Ok(records.remove(&Self::key(identifier, purpose)).is_some())
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        self.enter()?;
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| record.expires_at >= cutoff);
        Ok((before - records.len()) as u64)
    }

    async fn record_failed_attempt(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
        record_id: Uuid,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<u32>, DomainError> {
        self.enter()?;
        let mut records = self.records.lock().await;
        match records.get_mut(&Self::key(identifier, purpose)) {
            Some(record) if is_transition_allowed(record, record_id, max_attempts, now) => {
                record.attempts += 1;
                Ok(Some(record.attempts))
            }
            _ => Ok(None),
        }
    }

    async fn mark_verified(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
        record_id: Uuid,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.enter()?;
        let mut records = self.records.lock().await;
        match records.get_mut(&Self::key(identifier, purpose)) {
            Some(record) if is_transition_allowed(record, record_id, max_attempts, now) => {
                record.verified = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
