//! Caller-facing response types

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Response to an issuance request
///
/// Carries no code; the code only travels through the delivery gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueResponse {
    /// When the issued code stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Response to a verification request
///
/// Uniform across wrong code, expiry, lockout and unknown record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
}
