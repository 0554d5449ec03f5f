//! MySQL implementation of the OtpStore trait.
//!
//! One row per `(identifier, purpose)` in `otp_records`, enforced by a unique
//! key. Reissuing upserts over that key; attempt counting runs in a
//! transaction holding a row lock, and the Active to Verified transition is a
//! single conditional UPDATE.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use uuid::Uuid;

use jp_core::domain::entities::{OtpPurpose, OtpRecord};
use jp_core::errors::DomainError;
use jp_core::repositories::OtpStore;

use crate::InfrastructureError;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS otp_records (
        id CHAR(36) NOT NULL PRIMARY KEY,
        identifier VARCHAR(254) NOT NULL,
        purpose VARCHAR(32) NOT NULL,
        code VARCHAR(16) NOT NULL,
        created_at DATETIME(6) NOT NULL,
        expires_at DATETIME(6) NOT NULL,
        attempts INT UNSIGNED NOT NULL DEFAULT 0,
        verified BOOLEAN NOT NULL DEFAULT FALSE,
        UNIQUE KEY uk_otp_identifier_purpose (identifier, purpose),
        KEY idx_otp_expires_at (expires_at)
    )
"#;

/// Row shape of `otp_records`
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct OtpRow {
    pub id: String,
    pub identifier: String,
    pub purpose: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub attempts: u32,
    pub verified: bool,
}

impl TryFrom<OtpRow> for OtpRecord {
    type Error = DomainError;

    fn try_from(row: OtpRow) -> Result<Self, Self::Error> {
        Ok(OtpRecord {
            id: Uuid::parse_str(&row.id).map_err(|e| DomainError::Internal {
                message: format!("Invalid passcode record UUID: {}", e),
            })?,
            purpose: row.purpose.parse::<OtpPurpose>().map_err(|e| DomainError::Internal {
                message: format!("Corrupt passcode record: {}", e),
            })?,
            identifier: row.identifier,
            code: row.code,
            created_at: row.created_at,
            expires_at: row.expires_at,
            attempts: row.attempts,
            verified: row.verified,
        })
    }
}

/// MySQL implementation of OtpStore
pub struct MySqlOtpStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlOtpStore {
    /// Create a new MySQL passcode store
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create the `otp_records` table if it does not exist
    pub async fn ensure_schema(&self) -> Result<(), InfrastructureError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to create otp_records table");
            InfrastructureError::Database(e)
        })?;

        tracing::info!(event = "otp_schema_ready", "otp_records table ready");
        Ok(())
    }
}

#[async_trait]
impl OtpStore for MySqlOtpStore {
    async fn put(&self, record: &OtpRecord) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO otp_records (
                id, identifier, purpose, code, created_at, expires_at, attempts, verified
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                id = VALUES(id),
                code = VALUES(code),
                created_at = VALUES(created_at),
                expires_at = VALUES(expires_at),
                attempts = VALUES(attempts),
                verified = VALUES(verified)
        "#;

        sqlx::query(query)
            .bind(record.id.to_string())
            .bind(&record.identifier)
            .bind(record.purpose.as_str())
            .bind(&record.code)
            .bind(record.created_at)
            .bind(record.expires_at)
            .bind(record.attempts)
            .bind(record.verified)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::store(format!("Failed to store passcode: {}", e)))?;

        Ok(())
    }

    async fn get(&self, identifier: &str, purpose: OtpPurpose) -> Result<Option<OtpRecord>, DomainError> {
        let query = r#"
            SELECT id, identifier, purpose, code, created_at, expires_at, attempts, verified
            FROM otp_records
            WHERE identifier = ? AND purpose = ?
            LIMIT 1
        "#;

        let row: Option<OtpRow> = sqlx::query_as(query)
            .bind(identifier)
            .bind(purpose.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::store(format!("Failed to load passcode: {}", e)))?;

        row.map(OtpRecord::try_from).transpose()
    }

    async fn delete(&self, identifier: &str, purpose: OtpPurpose) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM otp_records WHERE identifier = ? AND purpose = ?")
            .bind(identifier)
            .bind(purpose.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::store(format!("Failed to delete passcode: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM otp_records WHERE expires_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::store(format!("Failed to sweep expired passcodes: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn record_failed_attempt(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
        record_id: Uuid,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<u32>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::store(format!("Failed to begin transaction: {}", e)))?;

        let current: Option<(String, u32, bool, DateTime<Utc>)> = sqlx::query_as(
            "SELECT id, attempts, verified, expires_at FROM otp_records WHERE identifier = ? AND purpose = ? FOR UPDATE",
        )
        .bind(identifier)
        .bind(purpose.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::store(format!("Failed to lock passcode: {}", e)))?;

        let attempts = match current {
            Some((id, attempts, verified, expires_at))
                if id == record_id.to_string() && !verified && attempts < max_attempts && expires_at >= now =>
            {
                attempts + 1
            }
            _ => return Ok(None),
        };

        sqlx::query("UPDATE otp_records SET attempts = ? WHERE id = ?")
            .bind(attempts)
            .bind(record_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::store(format!("Failed to record attempt: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::store(format!("Failed to commit attempt: {}", e)))?;

        Ok(Some(attempts))
    }

    async fn mark_verified(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
        record_id: Uuid,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE otp_records
            SET verified = TRUE
            WHERE identifier = ? AND purpose = ? AND id = ?
              AND verified = FALSE AND attempts < ? AND expires_at >= ?
        "#;

        let result = sqlx::query(query)
            .bind(identifier)
            .bind(purpose.as_str())
            .bind(record_id.to_string())
            .bind(max_attempts)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::store(format!("Failed to mark passcode verified: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }
}
