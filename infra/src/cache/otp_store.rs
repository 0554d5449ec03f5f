//! Redis-backed passcode store
//!
//! Each record is a hash at `{prefix}:{purpose}:{identifier}`. A sorted set at
//! `{prefix}:expiry_index` scores each hash key by its expiry in milliseconds
//! so the sweep never scans the keyspace.
//!
//! Redis evicts a hash on its own `expired_retention_secs` after expiry. Until
//! then a stale record still reads as expired rather than missing.
//!
//! Conditional transitions run as Lua scripts so the id check and the write
//! happen in one step. They are sent once and never replayed: a reply lost
//! after the script ran would otherwise count one guess twice.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use redis::Script;
use std::collections::HashMap;
use uuid::Uuid;

use jp_core::domain::entities::{OtpPurpose, OtpRecord};
use jp_core::errors::DomainError;
use jp_core::repositories::OtpStore;
use jp_shared::utils::mask_identifier;

use super::RedisClient;

/// Name of the expiry index, appended to the key prefix
const EXPIRY_INDEX: &str = "expiry_index";

const FIELD_ID: &str = "id";
const FIELD_IDENTIFIER: &str = "identifier";
const FIELD_PURPOSE: &str = "purpose";
const FIELD_CODE: &str = "code";
const FIELD_CREATED_AT: &str = "created_at_ms";
const FIELD_EXPIRES_AT: &str = "expires_at_ms";
const FIELD_ATTEMPTS: &str = "attempts";
const FIELD_VERIFIED: &str = "verified";

/// KEYS[1] record hash. ARGV[1] record id, ARGV[2] max attempts, ARGV[3] now
/// in milliseconds. Returns the new attempt count, or -1 when the transition
/// is refused.
static FAILED_ATTEMPT_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local fields = redis.call('HMGET', KEYS[1], 'id', 'attempts', 'verified', 'expires_at_ms')
        if not fields[1] or fields[1] ~= ARGV[1] then return -1 end
        if fields[3] == '1' then return -1 end
        if (tonumber(fields[2]) or 0) >= tonumber(ARGV[2]) then return -1 end
        if (tonumber(fields[4]) or 0) < tonumber(ARGV[3]) then return -1 end
        return redis.call('HINCRBY', KEYS[1], 'attempts', 1)
        "#,
    )
});

/// KEYS[1] record hash. ARGV[1] record id, ARGV[2] max attempts, ARGV[3] now
/// in milliseconds. Returns 1 when this call marked the record verified,
/// otherwise 0.
static MARK_VERIFIED_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local fields = redis.call('HMGET', KEYS[1], 'id', 'attempts', 'verified', 'expires_at_ms')
        if not fields[1] or fields[1] ~= ARGV[1] then return 0 end
        if fields[3] == '1' then return 0 end
        if (tonumber(fields[2]) or 0) >= tonumber(ARGV[2]) then return 0 end
        if (tonumber(fields[4]) or 0) < tonumber(ARGV[3]) then return 0 end
        redis.call('HSET', KEYS[1], 'verified', '1')
        return 1
        "#,
    )
});

/// KEYS[1] expiry index. ARGV[1] cutoff in milliseconds.
/// Deletes hashes whose stored expiry is before the cutoff and drops their
/// index entries. Returns the number of hashes deleted.
static SWEEP_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local cutoff = tonumber(ARGV[1])
        local members = redis.call('ZRANGEBYSCORE', KEYS[1], '-inf', '(' .. ARGV[1])
        local deleted = 0
        for _, key in ipairs(members) do
            local expires = redis.call('HGET', key, 'expires_at_ms')
            if not expires then
                redis.call('ZREM', KEYS[1], key)
            elseif tonumber(expires) < cutoff then
                redis.call('DEL', key)
                redis.call('ZREM', KEYS[1], key)
                deleted = deleted + 1
            end
        end
        return deleted
        "#,
    )
});

/// Redis implementation of OtpStore
pub struct RedisOtpStore {
    client: RedisClient,
}

impl RedisOtpStore {
    /// Create a new store on an existing client
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn record_key(&self, identifier: &str, purpose: OtpPurpose) -> String {
        self.client
            .config()
            .make_key(&format!("{}:{}", purpose.as_str(), identifier))
    }

    fn index_key(&self) -> String {
        self.client.config().make_key(EXPIRY_INDEX)
    }

    fn retention_ms(&self) -> i64 {
        i64::try_from(self.client.config().expired_retention_secs)
            .unwrap_or(i64::MAX / 1000)
            .saturating_mul(1000)
    }
}

/// Flatten a record into hash fields
pub(crate) fn record_to_fields(record: &OtpRecord) -> Vec<(&'static str, String)> {
    vec![
        (FIELD_ID, record.id.to_string()),
        (FIELD_IDENTIFIER, record.identifier.clone()),
        (FIELD_PURPOSE, record.purpose.as_str().to_string()),
        (FIELD_CODE, record.code.clone()),
        (FIELD_CREATED_AT, record.created_at.timestamp_millis().to_string()),
        (FIELD_EXPIRES_AT, record.expires_at.timestamp_millis().to_string()),
        (FIELD_ATTEMPTS, record.attempts.to_string()),
        (FIELD_VERIFIED, if record.verified { "1" } else { "0" }.to_string()),
    ]
}

/// Rebuild a record from `HGETALL` output; an empty map means no record
pub(crate) fn record_from_fields(fields: &HashMap<String, String>) -> Result<Option<OtpRecord>, DomainError> {
    if fields.is_empty() {
        return Ok(None);
    }

    let field = |name: &str| {
        fields.get(name).ok_or_else(|| DomainError::Internal {
            message: format!("Passcode record is missing field '{}'", name),
        })
    };
    let corrupt = |name: &str| DomainError::Internal {
        message: format!("Passcode record has a malformed '{}'", name),
    };
    let timestamp = |name: &str| -> Result<DateTime<Utc>, DomainError> {
        let millis: i64 = field(name)?.parse().map_err(|_| corrupt(name))?;
        Utc.timestamp_millis_opt(millis).single().ok_or_else(|| corrupt(name))
    };

    Ok(Some(OtpRecord {
        id: Uuid::parse_str(field(FIELD_ID)?).map_err(|_| corrupt(FIELD_ID))?,
        identifier: field(FIELD_IDENTIFIER)?.clone(),
        purpose: field(FIELD_PURPOSE)?.parse().map_err(|_| corrupt(FIELD_PURPOSE))?,
        code: field(FIELD_CODE)?.clone(),
        created_at: timestamp(FIELD_CREATED_AT)?,
        expires_at: timestamp(FIELD_EXPIRES_AT)?,
        attempts: field(FIELD_ATTEMPTS)?.parse().map_err(|_| corrupt(FIELD_ATTEMPTS))?,
        verified: field(FIELD_VERIFIED)? == "1",
    }))
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn put(&self, record: &OtpRecord) -> Result<(), DomainError> {
        let key = self.record_key(&record.identifier, record.purpose);
        let index = self.index_key();
        let fields = record_to_fields(record);
        let expires_ms = record.expires_at.timestamp_millis();
        let evict_at_ms = expires_ms.saturating_add(self.retention_ms());

        self.client
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                let index = index.clone();
                let fields = fields.clone();
                Box::pin(async move {
                    redis::pipe()
                        .atomic()
                        .del(&key)
                        .ignore()
                        .hset_multiple(&key, fields.as_slice())
                        .ignore()
                        .cmd("PEXPIREAT")
                        .arg(&key)
                        .arg(evict_at_ms)
                        .ignore()
                        .zadd(&index, &key, expires_ms)
                        .ignore()
                        .query_async::<_, ()>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    identifier = %mask_identifier(&record.identifier),
                    error = %e,
                    "Failed to store passcode in Redis"
                );
                DomainError::store(e)
            })
    }

    async fn get(&self, identifier: &str, purpose: OtpPurpose) -> Result<Option<OtpRecord>, DomainError> {
        let key = self.record_key(identifier, purpose);

        let fields: HashMap<String, String> = self
            .client
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move { redis::cmd("HGETALL").arg(&key).query_async(&mut conn).await })
            })
            .await
            .map_err(DomainError::store)?;

        record_from_fields(&fields)
    }

    async fn delete(&self, identifier: &str, purpose: OtpPurpose) -> Result<bool, DomainError> {
        let key = self.record_key(identifier, purpose);
        let index = self.index_key();

        let (removed, _): (i64, i64) = self
            .client
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                let index = index.clone();
                Box::pin(async move {
                    redis::pipe()
                        .atomic()
                        .del(&key)
                        .zrem(&index, &key)
                        .query_async(&mut conn)
                        .await
                })
            })
            .await
            .map_err(DomainError::store)?;

        Ok(removed > 0)
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let index = self.index_key();
        let cutoff_ms = cutoff.timestamp_millis();

        let deleted: i64 = self
            .client
            .execute_with_retry(|mut conn| {
                let index = index.clone();
                Box::pin(async move {
                    SWEEP_SCRIPT
                        .key(&index)
                        .arg(cutoff_ms)
                        .invoke_async(&mut conn)
                        .await
                })
            })
            .await
            .map_err(DomainError::store)?;

        Ok(u64::try_from(deleted).unwrap_or(0))
    }

    async fn record_failed_attempt(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
        record_id: Uuid,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<u32>, DomainError> {
        let key = self.record_key(identifier, purpose);
        let id = record_id.to_string();
        let now_ms = now.timestamp_millis();

        let attempts: i64 = self
            .client
            .execute_once(|mut conn| {
                let key = key.clone();
                let id = id.clone();
                Box::pin(async move {
                    FAILED_ATTEMPT_SCRIPT
                        .key(&key)
                        .arg(&id)
                        .arg(max_attempts)
                        .arg(now_ms)
                        .invoke_async(&mut conn)
                        .await
                })
            })
            .await
            .map_err(DomainError::store)?;

        Ok(u32::try_from(attempts).ok())
    }

    async fn mark_verified(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
        record_id: Uuid,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let key = self.record_key(identifier, purpose);
        let id = record_id.to_string();
        let now_ms = now.timestamp_millis();

        let marked: i64 = self
            .client
            .execute_once(|mut conn| {
                let key = key.clone();
                let id = id.clone();
                Box::pin(async move {
                    MARK_VERIFIED_SCRIPT
                        .key(&key)
                        .arg(&id)
                        .arg(max_attempts)
                        .arg(now_ms)
                        .invoke_async(&mut conn)
                        .await
                })
            })
            .await
            .map_err(DomainError::store)?;

        Ok(marked == 1)
    }
}
