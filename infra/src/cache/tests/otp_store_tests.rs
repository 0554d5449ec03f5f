//! Unit tests for the Redis record encoding

use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;

use jp_core::domain::entities::{OtpPurpose, OtpRecord};
use jp_core::errors::DomainError;

use crate::cache::otp_store::{record_from_fields, record_to_fields};

fn fields_of(record: &OtpRecord) -> HashMap<String, String> {
    record_to_fields(record)
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

fn sample() -> OtpRecord {
    let created = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
    let mut record = OtpRecord::new(
        "candidate@example.com",
        OtpPurpose::Registration,
        "007341",
        created,
        Duration::minutes(10),
    );
    record.attempts = 3;
    record
}

#[test]
fn test_empty_hash_is_no_record() {
    assert!(record_from_fields(&HashMap::new()).unwrap().is_none());
}

#[test]
fn test_hash_restores_the_record() {
    let record = sample();
    let restored = record_from_fields(&fields_of(&record)).unwrap().unwrap();

    assert_eq!(restored, record);
    assert_eq!(restored.code, "007341");
    assert_eq!(restored.expires_at - restored.created_at, Duration::minutes(10));
}

#[test]
fn test_verified_flag_encoding() {
    let mut record = sample();
    record.verified = true;

    let fields = fields_of(&record);
    assert_eq!(fields.get("verified").map(String::as_str), Some("1"));
    assert!(record_from_fields(&fields).unwrap().unwrap().verified);
}

#[test]
fn test_expiry_is_stored_in_milliseconds() {
    let record = sample();
    let fields = fields_of(&record);

    assert_eq!(
        fields.get("expires_at_ms").map(String::as_str),
        Some("1700000600123")
    );
}

#[test]
fn test_missing_field_is_internal_error() {
    let mut fields = fields_of(&sample());
    fields.remove("code");

    assert!(matches!(
        record_from_fields(&fields),
        Err(DomainError::Internal { .. })
    ));
}

#[test]
fn test_malformed_purpose_is_internal_error() {
    let mut fields = fields_of(&sample());
    fields.insert("purpose".to_string(), "reset".to_string());

    assert!(record_from_fields(&fields).is_err());
}
