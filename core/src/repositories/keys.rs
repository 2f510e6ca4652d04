//! Store key layout.

use crate::domain::entities::OtpPurpose;

/// Key for the state of one (subject, purpose) pair: `subject:purpose`
///
/// Purpose tags never contain `:`, so the last separator splits the key
/// unambiguously even when the subject itself contains colons.
pub fn record_key(subject: &str, purpose: &OtpPurpose) -> String {
    format!("{}:{}", subject, purpose.as_str())
}
