//! Unit tests for the passcode cleanup service

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

use crate::domain::entities::{OtpPurpose, OtpRecord};
use crate::errors::DomainError;
use crate::repositories::{InMemoryOtpStore, OtpStore};
use crate::services::otp::{CleanupResult, ManualClock, OtpCleanupConfig, OtpCleanupService};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

async fn seeded_store() -> Arc<InMemoryOtpStore> {
    let store = Arc::new(InMemoryOtpStore::new());
    let early = OtpRecord::new("early@x.com", OtpPurpose::Login, "111111", start(), Duration::minutes(10));
    let late = OtpRecord::new(
        "late@x.com",
        OtpPurpose::Login,
        "222222",
        start() + Duration::minutes(30),
        Duration::minutes(10),
    );
    store.put(&early).await.unwrap();
    store.put(&late).await.unwrap();
    store
}

#[tokio::test]
async fn test_run_cleanup_deletes_only_expired() {
    let store = seeded_store().await;
    let clock = Arc::new(ManualClock::new(start() + Duration::minutes(11)));
    let service = OtpCleanupService::with_clock(store.clone(), clock, OtpCleanupConfig::default());

    let result = service.run_cleanup().await.unwrap();
    assert_eq!(result.expired_records_deleted, 1);
    assert!(store.get("early@x.com", OtpPurpose::Login).await.unwrap().is_none());
    assert!(store.get("late@x.com", OtpPurpose::Login).await.unwrap().is_some());
}

#[tokio::test]
async fn test_run_cleanup_is_idempotent() {
    let store = seeded_store().await;
    let clock = Arc::new(ManualClock::new(start() + Duration::hours(2)));
    let service = OtpCleanupService::with_clock(store.clone(), clock, OtpCleanupConfig::default());

    assert_eq!(service.run_cleanup().await.unwrap().expired_records_deleted, 2);
    assert_eq!(service.run_cleanup().await.unwrap(), CleanupResult::default());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_disabled_cleanup_does_nothing() {
    let store = seeded_store().await;
    let clock = Arc::new(ManualClock::new(start() + Duration::hours(2)));
    let config = OtpCleanupConfig {
        enabled: false,
        ..Default::default()
    };
    let service = Arc::new(OtpCleanupService::with_clock(store.clone(), clock, config));

    assert_eq!(service.run_cleanup().await.unwrap().expired_records_deleted, 0);
    assert!(service.clone().start_background_task().is_none());
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_store_outage_is_reported() {
    let store = seeded_store().await;
    store.set_unavailable(true);
    let service = OtpCleanupService::new(store, OtpCleanupConfig::default());

    let err = service.run_cleanup().await.unwrap_err();
    assert!(matches!(err, DomainError::StoreUnavailable { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_background_task_sweeps_on_interval() {
    let store = seeded_store().await;
    let clock = Arc::new(ManualClock::new(start() + Duration::hours(2)));
    let config = OtpCleanupConfig {
        interval_seconds: 60,
        enabled: true,
    };
    let service = Arc::new(OtpCleanupService::with_clock(store.clone(), clock, config));

    let handle = service.start_background_task().unwrap();
    // First tick fires immediately
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    assert!(store.is_empty().await);

    handle.abort();
}
