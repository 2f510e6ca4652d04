//! Unit tests for domain error types

use crate::errors::{DomainError, StoreError};

#[test]
fn test_store_unavailable_maps_to_retryable_error() {
    let error: DomainError = StoreError::Unavailable("connection refused".to_string()).into();
    assert!(matches!(error, DomainError::StoreUnavailable { .. }));
    assert!(error.is_retryable());
    assert!(error.to_string().contains("connection refused"));
}

#[test]
fn test_denied_carries_retry_after() {
    let error = DomainError::Denied {
        retry_after_seconds: 42,
    };
    assert!(error.is_retryable());
    assert_eq!(error.retry_after_seconds(), Some(42));
    assert!(error.to_string().contains("42"));
}

#[test]
fn test_validation_is_not_retryable() {
    let error = DomainError::Validation {
        message: "subject must not be empty".to_string(),
    };
    assert!(!error.is_retryable());
    assert_eq!(error.retry_after_seconds(), None);
}

#[test]
fn test_corrupt_record_never_maps_to_store_unavailable() {
    let error: DomainError = StoreError::CorruptRecord("bad salt".to_string()).into();
    assert!(matches!(error, DomainError::Internal { .. }));
    assert!(!StoreError::CorruptRecord("x".to_string()).is_unavailable());
}
