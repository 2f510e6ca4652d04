//! Business services containing the OTP logic.

pub mod code_generator;
pub mod hashing;
pub mod otp;
pub mod rate_limiter;

// Re-export commonly used types
pub use code_generator::{Alphabet, CodeGenerator};
pub use hashing::CodeHasher;
pub use otp::{
    DeliveryError, DeliveryGateway, IssueResponse, OtpEndpoint, OtpService, OtpServiceConfig,
    VerifyResponse,
};
pub use rate_limiter::{RateLimitPolicy, RateLimiter};
