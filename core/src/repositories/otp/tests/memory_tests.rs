//! Tests for the in-memory passcode store

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{OtpPurpose, OtpRecord, MAX_ATTEMPTS};
use crate::errors::DomainError;
use crate::repositories::otp::{InMemoryOtpStore, OtpStore};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn record(identifier: &str, purpose: OtpPurpose, code: &str) -> OtpRecord {
    OtpRecord::new(identifier, purpose, code, now(), Duration::minutes(10))
}

#[tokio::test]
async fn test_put_replaces_record_for_same_key() {
    let store = InMemoryOtpStore::new();
    let first = record("a@x.com", OtpPurpose::Login, "111111");
    let second = record("a@x.com", OtpPurpose::Login, "222222");

    store.put(&first).await.unwrap();
    store.put(&second).await.unwrap();

    let stored = store.get("a@x.com", OtpPurpose::Login).await.unwrap().unwrap();
    assert_eq!(stored, second);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_purposes_are_independent_keys() {
    let store = InMemoryOtpStore::new();
    store.put(&record("a@x.com", OtpPurpose::Login, "111111")).await.unwrap();
    store.put(&record("a@x.com", OtpPurpose::Registration, "222222")).await.unwrap();

    assert_eq!(store.len().await, 2);
    assert!(store.delete("a@x.com", OtpPurpose::Login).await.unwrap());
    assert!(!store.delete("a@x.com", OtpPurpose::Login).await.unwrap());
    assert!(store.get("a@x.com", OtpPurpose::Registration).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_expired_before_is_strict() {
    let store = InMemoryOtpStore::new();
    let old = record("old@x.com", OtpPurpose::Login, "111111");
    let mut fresh = record("fresh@x.com", OtpPurpose::Login, "222222");
    fresh.expires_at = old.expires_at + Duration::minutes(5);

    store.put(&old).await.unwrap();
    store.put(&fresh).await.unwrap();

    // A record expiring exactly at the cutoff stays
    assert_eq!(store.delete_expired_before(old.expires_at).await.unwrap(), 0);

    let cutoff = old.expires_at + Duration::seconds(1);
    assert_eq!(store.delete_expired_before(cutoff).await.unwrap(), 1);
    assert_eq!(store.delete_expired_before(cutoff).await.unwrap(), 0);
    assert!(store.get("fresh@x.com", OtpPurpose::Login).await.unwrap().is_some());
}

#[tokio::test]
async fn test_sweep_spares_reissued_record() {
    let store = InMemoryOtpStore::new();
    let stale = record("a@x.com", OtpPurpose::Login, "111111");
    store.put(&stale).await.unwrap();

    let later = now() + Duration::minutes(15);
    let reissued = OtpRecord::new("a@x.com", OtpPurpose::Login, "333333", later, Duration::minutes(10));
    store.put(&reissued).await.unwrap();

    assert_eq!(store.delete_expired_before(later).await.unwrap(), 0);
    let stored = store.get("a@x.com", OtpPurpose::Login).await.unwrap().unwrap();
    assert_eq!(stored.id, reissued.id);
}

#[tokio::test]
async fn test_record_failed_attempt_stops_at_max() {
    let store = InMemoryOtpStore::new();
    let otp = record("a@x.com", OtpPurpose::Login, "123456");
    store.put(&otp).await.unwrap();

    for expected in 1..=MAX_ATTEMPTS {
        let count = store
            .record_failed_attempt("a@x.com", OtpPurpose::Login, otp.id, MAX_ATTEMPTS, now())
            .await
            .unwrap();
        assert_eq!(count, Some(expected));
    }

    let count = store
        .record_failed_attempt("a@x.com", OtpPurpose::Login, otp.id, MAX_ATTEMPTS, now())
        .await
        .unwrap();
    assert_eq!(count, None);

    let stored = store.get("a@x.com", OtpPurpose::Login).await.unwrap().unwrap();
    assert_eq!(stored.attempts, MAX_ATTEMPTS);
}

#[tokio::test]
async fn test_transitions_ignore_superseded_issuance() {
    let store = InMemoryOtpStore::new();
    let otp = record("a@x.com", OtpPurpose::Login, "123456");
    store.put(&otp).await.unwrap();

    let stale_id = Uuid::new_v4();
    assert_eq!(
        store.record_failed_attempt("a@x.com", OtpPurpose::Login, stale_id, MAX_ATTEMPTS, now()).await.unwrap(),
        None
    );
    assert!(!store.mark_verified("a@x.com", OtpPurpose::Login, stale_id, MAX_ATTEMPTS, now()).await.unwrap());
    assert!(!store.mark_verified("b@x.com", OtpPurpose::Login, otp.id, MAX_ATTEMPTS, now()).await.unwrap());
}

#[tokio::test]
async fn test_mark_verified_happens_once() {
    let store = InMemoryOtpStore::new();
    let otp = record("a@x.com", OtpPurpose::Registration, "123456");
    store.put(&otp).await.unwrap();

    assert!(store.mark_verified("a@x.com", OtpPurpose::Registration, otp.id, MAX_ATTEMPTS, now()).await.unwrap());
    assert!(!store.mark_verified("a@x.com", OtpPurpose::Registration, otp.id, MAX_ATTEMPTS, now()).await.unwrap());
    assert_eq!(
        store.record_failed_attempt("a@x.com", OtpPurpose::Registration, otp.id, MAX_ATTEMPTS, now()).await.unwrap(),
        None
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_failed_attempts_are_all_counted() {
    let store = Arc::new(InMemoryOtpStore::new());
    let otp = record("a@x.com", OtpPurpose::Login, "123456");
    store.put(&otp).await.unwrap();

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let store = store.clone();
            let id = otp.id;
            tokio::spawn(async move {
                store.record_failed_attempt("a@x.com", OtpPurpose::Login, id, MAX_ATTEMPTS, now()).await
            })
        })
        .collect();

    let mut counts = Vec::new();
    for handle in handles {
        counts.push(handle.await.unwrap().unwrap().unwrap());
    }
    counts.sort_unstable();
    assert_eq!(counts, vec![1, 2, 3]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_successes_yield_one_winner() {
    let store = Arc::new(InMemoryOtpStore::new());
    let otp = record("a@x.com", OtpPurpose::Login, "123456");
    store.put(&otp).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            let id = otp.id;
            tokio::spawn(async move {
                store.mark_verified("a@x.com", OtpPurpose::Login, id, MAX_ATTEMPTS, now()).await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_unavailable_store_reports_store_error() {
    let store = InMemoryOtpStore::new();
    store.set_unavailable(true);

    let err = store.get("a@x.com", OtpPurpose::Login).await.unwrap_err();
    assert!(matches!(err, DomainError::StoreUnavailable { .. }));
    assert_eq!(store.call_count(), 1);

    store.set_unavailable(false);
    assert!(store.get("a@x.com", OtpPurpose::Login).await.unwrap().is_none());
}

#[tokio::test]
async fn test_transitions_refuse_expired_record() {
    let store = InMemoryOtpStore::new();
    let otp = record("a@x.com", OtpPurpose::Login, "123456");
    store.put(&otp).await.unwrap();

    // Still accepted at the exact expiry instant
    let at_expiry = otp.expires_at;
    let past_expiry = otp.expires_at + Duration::seconds(1);

    assert_eq!(
        store.record_failed_attempt("a@x.com", OtpPurpose::Login, otp.id, MAX_ATTEMPTS, past_expiry).await.unwrap(),
        None
    );
    assert!(!store.mark_verified("a@x.com", OtpPurpose::Login, otp.id, MAX_ATTEMPTS, past_expiry).await.unwrap());

    let stored = store.get("a@x.com", OtpPurpose::Login).await.unwrap().unwrap();
    assert_eq!(stored.attempts, 0);
    assert!(!stored.verified);

    assert!(store.mark_verified("a@x.com", OtpPurpose::Login, otp.id, MAX_ATTEMPTS, at_expiry).await.unwrap());
}
