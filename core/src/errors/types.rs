//! Error types raised at the store boundary

use thiserror::Error;

/// Errors returned by credential and rate-limit stores
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or rejected the command
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// No live record exists for the key
    #[error("Record not found")]
    NotFound,

    /// A record exists but could not be decoded
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

impl StoreError {
    /// Whether the error reflects an infrastructure failure
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
