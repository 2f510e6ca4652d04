//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

pub use types::{StoreError, StoreResult};

use thiserror::Error;

/// Core domain errors
///
/// Verification outcomes (wrong code, expired, locked out) are not errors;
/// they are reported through `VerifyOutcome`. Only conditions the caller
/// must handle differently from "your code was wrong" surface here.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Issuance denied by rate limit, retry after {retry_after_seconds}s")]
    Denied { retry_after_seconds: u64 },

    #[error("Credential store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::Denied { .. } | DomainError::StoreUnavailable { .. }
        )
    }

    /// Seconds the caller should wait before retrying, when known
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            DomainError::Denied { retry_after_seconds } => Some(*retry_after_seconds),
            _ => None,
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Unavailable(message) => DomainError::StoreUnavailable { message },
            // Callers that can recover from these handle them before converting
            StoreError::NotFound => DomainError::Internal {
                message: "record not found".to_string(),
            },
            StoreError::CorruptRecord(message) => DomainError::Internal {
                message: format!("corrupt record: {}", message),
            },
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
