//! OTP record entity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::purpose::OtpPurpose;

/// Lifecycle state of a record
///
/// Absence of a record is the `NONE` state. Only `Active` records can be
/// verified; every other state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpState {
    Active,
    Consumed,
    Expired,
    Locked,
}

/// Stored state of one issued code, keyed by (subject, purpose)
///
/// The raw code is never part of the record; only its salted hash is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Issuance identifier, used to correlate log lines
    pub id: Uuid,

    /// Opaque subject identifier (phone number, user id)
    pub subject: String,

    /// Use-case the code was issued for
    pub purpose: OtpPurpose,

    /// Hex-encoded salted hash of the code
    pub code_hash: String,

    /// Hex-encoded per-record salt
    pub salt: String,

    /// Timestamp when the code was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp after which the code is no longer accepted
    pub expires_at: DateTime<Utc>,

    /// Failed verification attempts since issuance
    pub attempts: u32,

    /// Whether the code has been successfully verified
    pub consumed: bool,
}

impl OtpRecord {
    /// Create a fresh record issued at `issued_at` and valid for `ttl`
    pub fn new(
        subject: impl Into<String>,
        purpose: OtpPurpose,
        code_hash: String,
        salt: String,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            purpose,
            code_hash,
            salt,
            issued_at,
            expires_at: issued_at + ttl,
            attempts: 0,
            consumed: false,
        }
    }

    /// Whether the code has passed its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Lifecycle state at `now` under an attempt cap of `max_attempts`
    pub fn state_at(&self, now: DateTime<Utc>, max_attempts: u32) -> OtpState {
        if self.consumed {
            OtpState::Consumed
        } else if self.is_expired_at(now) {
            OtpState::Expired
        } else if self.attempts >= max_attempts {
            OtpState::Locked
        } else {
            OtpState::Active
        }
    }

    /// Time left until expiry, zero once expired
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(issued_at: DateTime<Utc>) -> OtpRecord {
        OtpRecord::new(
            "+15551234567",
            OtpPurpose::Login,
            "ab".repeat(32),
            "cd".repeat(16),
            issued_at,
            Duration::seconds(300),
        )
    }

    #[test]
    fn test_new_record() {
        let now = Utc::now();
        let record = record(now);

        assert_eq!(record.expires_at, now + Duration::seconds(300));
        assert_eq!(record.attempts, 0);
        assert!(!record.consumed);
        assert_eq!(record.state_at(now, 5), OtpState::Active);
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let record = record(now);

        assert!(!record.is_expired_at(record.expires_at));
        assert!(record.is_expired_at(record.expires_at + Duration::milliseconds(1)));
        assert_eq!(
            record.state_at(record.expires_at + Duration::seconds(1), 5),
            OtpState::Expired
        );
    }

    #[test]
    fn test_state_precedence() {
        let now = Utc::now();
        let mut record = record(now);

        record.attempts = 5;
        assert_eq!(record.state_at(now, 5), OtpState::Locked);
        assert_eq!(record.state_at(now, 6), OtpState::Active);

        record.consumed = true;
        assert_eq!(record.state_at(now, 5), OtpState::Consumed);
    }

    #[test]
    fn test_remaining_ttl() {
        let now = Utc::now();
        let record = record(now);

        assert_eq!(record.remaining_ttl(now), Duration::seconds(300));
        assert_eq!(
            record.remaining_ttl(now + Duration::seconds(301)),
            Duration::zero()
        );
    }
}
