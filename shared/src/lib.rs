//! Shared utilities and common types for the SMS-OTP server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and layered loading
//! - Logging bootstrap
//! - Log masking helpers

pub mod config;
pub mod errors;
pub mod logging;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, Environment, LogFormat, LoggingConfig, OtpPolicyConfig,
    RateLimitConfig,
};
pub use errors::ConfigError;
pub use logging::init_tracing;
pub use utils::mask_subject;
