//! Configuration for the OTP service

use std::time::Duration;

use otp_shared::OtpPolicyConfig;

use crate::errors::{DomainError, DomainResult};
use crate::services::code_generator::Alphabet;

/// Settings for [`OtpService`](super::OtpService)
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Characters per code
    pub code_length: usize,
    /// Characters codes are drawn from
    pub alphabet: Alphabet,
    /// Lifetime of an issued code
    pub ttl: Duration,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            alphabet: Alphabet::numeric(),
            ttl: Duration::from_secs(300),
        }
    }
}

impl TryFrom<&OtpPolicyConfig> for OtpServiceConfig {
    type Error = DomainError;

    fn try_from(policy: &OtpPolicyConfig) -> DomainResult<Self> {
        if policy.ttl_seconds == 0 {
            return Err(DomainError::Validation {
                message: "ttl_seconds must be greater than 0".to_string(),
            });
        }

        Ok(Self {
            code_length: policy.code_length,
            alphabet: Alphabet::new(&policy.alphabet)?,
            ttl: Duration::from_secs(policy.ttl_seconds),
        })
    }
}
