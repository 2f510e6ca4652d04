//! Results of issuance and verification.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::otp_code::OtpCode;

/// A freshly issued code
///
/// Only handed to the immediate caller for delivery; never persisted.
#[derive(Debug, Clone)]
pub struct IssuedOtp {
    /// The raw code
    pub code: OtpCode,
    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,
    /// Identifier of the stored record
    pub issuance_id: Uuid,
}

/// Outcome of a verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Code matched; the record is consumed
    Success,
    /// Code did not match
    InvalidCode { remaining_attempts: u32 },
    /// The record outlived its TTL
    Expired,
    /// The attempt cap was reached; the record is invalidated
    LockedOut,
    /// No active record (never issued, consumed, or purged)
    NotFound,
}

impl VerifyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, VerifyOutcome::Success)
    }

    /// Short label used in structured logs
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyOutcome::Success => "success",
            VerifyOutcome::InvalidCode { .. } => "invalid_code",
            VerifyOutcome::Expired => "expired",
            VerifyOutcome::LockedOut => "locked_out",
            VerifyOutcome::NotFound => "not_found",
        }
    }
}
