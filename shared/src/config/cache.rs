//! Cache configuration module

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Redis cache configuration
///
/// The connection URL has no built-in default: it may carry credentials and
/// must come from the environment or a deployment config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Namespace prepended to every key written by the service
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Maximum retry attempts for idempotent commands and initial connect
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds (doubled per attempt)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl CacheConfig {
    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key_prefix: default_key_prefix(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.key_prefix, key)
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "cache.url".to_string(),
            });
        }
        if !(self.url.starts_with("redis://")
            || self.url.starts_with("rediss://")
            || self.url.starts_with("redis+unix://"))
        {
            return Err(ConfigError::Invalid {
                key: "cache.url".to_string(),
                reason: format!("unsupported scheme in {}", mask_url(&self.url)),
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid {
                key: "cache.max_retries".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Mask the credential part of a Redis URL for logging
pub fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(proto_end) = url.find("://") {
            if proto_end + 3 <= at_pos {
                let proto = &url[..proto_end + 3];
                let host_part = &url[at_pos..];
                return format!("{}****{}", proto, host_part);
            }
        }
    }
    url.to_string()
}

fn default_key_prefix() -> String {
    String::from("otp")
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}
