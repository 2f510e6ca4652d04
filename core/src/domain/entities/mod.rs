//! Domain entities representing core business objects.

pub mod otp_record;
pub mod purpose;

// Re-export commonly used types
pub use otp_record::{OtpRecord, OtpState};
pub use purpose::OtpPurpose;
