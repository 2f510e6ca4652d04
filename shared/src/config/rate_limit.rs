//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Issuance rate limits, applied per (subject, purpose)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Minimum seconds between two issuances; 0 disables the cooldown
    #[serde(default = "default_cooldown")]
    pub issuance_cooldown_seconds: u64,

    /// Length of the issuance counting window in seconds
    #[serde(default = "default_window")]
    pub window_seconds: u64,

    /// Max issuances allowed inside one window
    #[serde(default = "default_max_per_window")]
    pub max_issuances_per_window: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            issuance_cooldown_seconds: default_cooldown(),
            window_seconds: default_window(),
            max_issuances_per_window: default_max_per_window(),
        }
    }
}

impl RateLimitConfig {
    /// Relaxed limits for local development
    pub fn development() -> Self {
        Self {
            issuance_cooldown_seconds: 5,
            window_seconds: 600,
            max_issuances_per_window: 20,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "rate_limit.window_seconds".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.max_issuances_per_window == 0 {
            return Err(ConfigError::Invalid {
                key: "rate_limit.max_issuances_per_window".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.issuance_cooldown_seconds > self.window_seconds {
            return Err(ConfigError::Invalid {
                key: "rate_limit.issuance_cooldown_seconds".to_string(),
                reason: "must not exceed window_seconds".to_string(),
            });
        }
        Ok(())
    }
}

fn default_cooldown() -> u64 {
    60
}

fn default_window() -> u64 {
    3600 // 1 hour
}

fn default_max_per_window() -> u32 {
    5
}
