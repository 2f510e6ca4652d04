//! # Infrastructure Layer
//!
//! Concrete implementations of the store and delivery boundaries defined in
//! `otp_core`:
//!
//! - **Cache**: Redis client, credential store and rate-limit store
//! - **Delivery**: log-only delivery gateway for development
//! - **Bootstrap**: builds a ready `OtpEndpoint` from `AppConfig`

pub mod bootstrap;
pub mod cache;
pub mod delivery;

pub use bootstrap::{connect, connect_with_delivery, RedisOtpEndpoint, RedisOtpService};
pub use cache::{RedisClient, RedisCredentialStore, RedisRateLimitStore};
pub use delivery::LoggingDeliveryGateway;

use otp_core::errors::DomainError;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The OTP policy could not be applied
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}
