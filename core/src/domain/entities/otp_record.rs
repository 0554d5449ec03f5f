//! One-time passcode record entity for email-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::DomainError;

/// Maximum number of failed verifications before a record is exhausted
pub const MAX_ATTEMPTS: u32 = 5;

/// Length of the generated passcode
pub const CODE_LENGTH: usize = 6;

/// Default lifetime of a passcode (10 minutes)
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 10;

/// Use-case a passcode was issued for.
///
/// The same identifier may hold one live passcode per purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Registration,
    Login,
    PasswordReset,
}

impl OtpPurpose {
    /// All purposes, in declaration order
    pub const ALL: [OtpPurpose; 3] = [
        OtpPurpose::Registration,
        OtpPurpose::Login,
        OtpPurpose::PasswordReset,
    ];

    /// Wire/storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Registration => "registration",
            OtpPurpose::Login => "login",
            OtpPurpose::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OtpPurpose {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registration" => Ok(OtpPurpose::Registration),
            "login" => Ok(OtpPurpose::Login),
            "password_reset" => Ok(OtpPurpose::PasswordReset),
            other => Err(DomainError::InvalidPurpose {
                purpose: other.to_string(),
            }),
        }
    }
}

/// Lifecycle state of a record at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpState {
    /// Accepts verification attempts
    Active,
    /// Attempt budget spent; sticky even for the correct code
    Exhausted,
    /// Past `expires_at`
    Expired,
    /// Consumed by a successful verification
    Verified,
}

/// One-time passcode record, unique per `(identifier, purpose)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Issuance identifier; a superseding record always gets a fresh one
    pub id: Uuid,

    /// Normalized contact handle (lower-cased email address)
    pub identifier: String,

    /// Use-case the code was issued for
    pub purpose: OtpPurpose,

    /// Fixed-length numeric code, leading zeros preserved
    pub code: String,

    /// Issuance timestamp
    pub created_at: DateTime<Utc>,

    /// Timestamp after which the code is rejected
    pub expires_at: DateTime<Utc>,

    /// Failed verification count
    pub attempts: u32,

    /// Set exactly once on successful verification
    pub verified: bool,
}

impl OtpRecord {
    /// Creates a fresh record issued at `now` and valid for `ttl`
    pub fn new(
        identifier: impl Into<String>,
        purpose: OtpPurpose,
        code: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier: identifier.into(),
            purpose,
            code: code.into(),
            created_at: now,
            expires_at: now + ttl,
            attempts: 0,
            verified: false,
        }
    }

    /// Checks if the record has expired at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Checks if the attempt budget is spent
    pub fn is_exhausted(&self, max_attempts: u32) -> bool {
        self.attempts >= max_attempts
    }

    /// Derives the lifecycle state.
    ///
    /// Precedence follows the verification order: a consumed record reads as
    /// `Verified`, then expiry is checked before the attempt budget.
    pub fn state(&self, now: DateTime<Utc>, max_attempts: u32) -> OtpState {
        if self.verified {
            OtpState::Verified
        } else if self.is_expired(now) {
            OtpState::Expired
        } else if self.is_exhausted(max_attempts) {
            OtpState::Exhausted
        } else {
            OtpState::Active
        }
    }
}
