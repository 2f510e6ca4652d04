//! Store boundaries for OTP records and rate-limit counters.
//!
//! Traits live here; Redis implementations live in the infrastructure crate.
//! The in-memory implementations back tests and single-process deployments.

pub mod credential;
pub mod keys;
pub mod rate_limit;

pub use credential::{CredentialStore, InMemoryCredentialStore};
pub use keys::record_key;
pub use rate_limit::{InMemoryRateLimitStore, RateLimitStore};
