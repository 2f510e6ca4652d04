//! # OTP Core
//!
//! Core business logic for one-time code issuance and verification.
//! This crate contains the domain entities, the store traits with in-memory
//! backends, the code generator and hasher, the rate limiter, and the
//! service and endpoint that compose them.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{OtpPurpose, OtpRecord, OtpState};
pub use domain::value_objects::{
    CooldownStatus, IssuanceDecision, IssuedOtp, OtpCode, RateLimitState, VerificationDecision,
    VerifyOutcome, WindowCount,
};
pub use errors::{DomainError, DomainResult, StoreError, StoreResult};
pub use repositories::{
    record_key, CredentialStore, InMemoryCredentialStore, InMemoryRateLimitStore, RateLimitStore,
};
pub use services::{
    Alphabet, CodeGenerator, CodeHasher, DeliveryError, DeliveryGateway, IssueResponse,
    OtpEndpoint, OtpService, OtpServiceConfig, RateLimitPolicy, RateLimiter, VerifyResponse,
};
