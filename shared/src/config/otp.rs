//! OTP policy configuration module

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Shortest code the policy accepts
pub const MIN_CODE_LENGTH: usize = 4;

/// Longest code the policy accepts
pub const MAX_CODE_LENGTH: usize = 32;

/// Code generation and verification policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpPolicyConfig {
    /// Number of characters in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Characters codes are drawn from
    #[serde(default = "default_alphabet")]
    pub alphabet: String,

    /// Lifetime of an issued code in seconds
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,

    /// Failed verifications tolerated before the code is locked
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for OtpPolicyConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            alphabet: default_alphabet(),
            ttl_seconds: default_ttl(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl OtpPolicyConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&self.code_length) {
            return Err(ConfigError::Invalid {
                key: "otp.code_length".to_string(),
                reason: format!(
                    "must be between {} and {}",
                    MIN_CODE_LENGTH, MAX_CODE_LENGTH
                ),
            });
        }

        if !self.alphabet.chars().all(|c| c.is_ascii_graphic()) {
            return Err(ConfigError::Invalid {
                key: "otp.alphabet".to_string(),
                reason: "must contain printable ASCII characters only".to_string(),
            });
        }
        let mut distinct: Vec<char> = self.alphabet.chars().collect();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 2 || distinct.len() != self.alphabet.len() {
            return Err(ConfigError::Invalid {
                key: "otp.alphabet".to_string(),
                reason: "must contain at least two characters, each once".to_string(),
            });
        }

        if self.ttl_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "otp.ttl_seconds".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "otp.max_attempts".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

fn default_code_length() -> usize {
    6
}

fn default_alphabet() -> String {
    String::from("0123456789")
}

fn default_ttl() -> u64 {
    300 // 5 minutes
}

fn default_max_attempts() -> u32 {
    5
}
