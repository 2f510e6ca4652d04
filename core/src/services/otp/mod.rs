//! OTP issuance and verification
//!
//! This module provides the orchestration on top of the stores:
//! - `OtpService` issues and verifies codes against a credential store
//! - `OtpEndpoint` is the transport-agnostic caller-facing API that also
//!   hands fresh codes to a delivery gateway

mod config;
mod endpoint;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::OtpServiceConfig;
pub use endpoint::OtpEndpoint;
pub use service::OtpService;
pub use traits::{DeliveryError, DeliveryGateway};
pub use types::{IssueResponse, VerifyResponse};
