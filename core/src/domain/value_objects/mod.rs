//! Value objects representing immutable domain concepts.

pub mod otp_code;
pub mod outcomes;
pub mod rate_limit;

// Re-export commonly used types
pub use otp_code::OtpCode;
pub use outcomes::{IssuedOtp, VerifyOutcome};
pub use rate_limit::{
    CooldownStatus, IssuanceDecision, RateLimitState, VerificationDecision, WindowCount,
};
