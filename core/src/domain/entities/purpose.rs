//! OTP purpose tags.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

// Lowercase tag, safe to embed in store keys
static PURPOSE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9_-]{0,31}$").unwrap()
});

/// Use-case an OTP was issued for
///
/// Records are keyed by (subject, purpose), so one subject may hold an
/// independent active code per purpose.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OtpPurpose {
    /// Sign-in
    Login,
    /// New account registration
    Registration,
    /// Password reset
    PasswordReset,
    /// Confirmation of a single transaction
    TransactionConfirm,
    /// Deployment-specific purpose
    Custom(String),
}

impl OtpPurpose {
    /// Build a custom purpose, validating the tag
    pub fn custom(tag: impl Into<String>) -> Result<Self, DomainError> {
        let tag = tag.into();
        if !PURPOSE_TAG_REGEX.is_match(&tag) {
            return Err(DomainError::Validation {
                message: format!("Invalid purpose tag: {}", tag),
            });
        }
        Ok(OtpPurpose::Custom(tag))
    }

    /// Stable tag used in store keys and logs
    pub fn as_str(&self) -> &str {
        match self {
            OtpPurpose::Login => "login",
            OtpPurpose::Registration => "registration",
            OtpPurpose::PasswordReset => "password_reset",
            OtpPurpose::TransactionConfirm => "transaction_confirm",
            OtpPurpose::Custom(tag) => tag,
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
            "login" => Ok(OtpPurpose::Login),
            "registration" => Ok(OtpPurpose::Registration),
            "password_reset" => Ok(OtpPurpose::PasswordReset),
            "transaction_confirm" => Ok(OtpPurpose::TransactionConfirm),
            other => OtpPurpose::custom(other),
        }
    }
}

impl Serialize for OtpPurpose {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OtpPurpose {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}
