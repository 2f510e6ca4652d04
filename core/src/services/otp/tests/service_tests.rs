//! Unit tests for OtpService

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::mocks::{policy, service_with, wrong_code, MockCredentialStore, UnavailableRateLimitStore};
use crate::domain::entities::OtpPurpose;
use crate::domain::value_objects::VerifyOutcome;
use crate::errors::DomainError;
use crate::services::code_generator::Alphabet;
use crate::services::otp::{OtpService, OtpServiceConfig};
use crate::services::rate_limiter::RateLimiter;

#[tokio::test]
async fn test_issue_stores_hashed_record() {
    let store = Arc::new(MockCredentialStore::new());
    let service = service_with(store.clone(), policy(60, 5));

    let before = Utc::now();
    let issued = service.issue("+15551234567", &OtpPurpose::Login).await.unwrap();

    assert_eq!(issued.code.len(), 6);
    assert!(issued.code.expose().chars().all(|c| c.is_ascii_digit()));
    assert!(issued.expires_at >= before + ChronoDuration::seconds(300));
    assert!(issued.expires_at <= Utc::now() + ChronoDuration::seconds(300));

    let record = store.record("+15551234567", &OtpPurpose::Login).unwrap();
    assert_eq!(record.id, issued.issuance_id);
    assert_eq!(record.attempts, 0);
    assert!(!record.consumed);
    assert_eq!(record.code_hash.len(), 64);
    assert_ne!(record.code_hash, issued.code.expose());
    assert_ne!(record.salt, issued.code.expose());
}

#[tokio::test]
async fn test_issue_then_verify() {
    let store = Arc::new(MockCredentialStore::new());
    let service = service_with(store.clone(), policy(60, 5));

    let issued = service.issue("+1555", &OtpPurpose::Login).await.unwrap();

    let outcome = service
        .verify("+1555", &OtpPurpose::Login, issued.code.expose())
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Success);
    assert!(store.record("+1555", &OtpPurpose::Login).is_none());
}

#[tokio::test]
async fn test_wrong_then_right_then_replay() {
    let store = Arc::new(MockCredentialStore::new());
    let service = service_with(store.clone(), policy(60, 5));
    store.seed("+1555", OtpPurpose::Login, "482913");

    let outcome = service
        .verify("+1555", &OtpPurpose::Login, "000000")
        .await
        .unwrap();
    assert_eq!(
        outcome,
        VerifyOutcome::InvalidCode {
            remaining_attempts: 4
        }
    );
    assert_eq!(store.record("+1555", &OtpPurpose::Login).unwrap().attempts, 1);

    let outcome = service
        .verify("+1555", &OtpPurpose::Login, "482913")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Success);

    // No replay
    let outcome = service
        .verify("+1555", &OtpPurpose::Login, "482913")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::NotFound);
}

#[tokio::test]
async fn test_lockout_after_max_attempts() {
    let store = Arc::new(MockCredentialStore::new());
    let service = service_with(store.clone(), policy(60, 5));
    store.seed("+1555", OtpPurpose::Login, "482913");

    for expected_remaining in (0..5).rev() {
        let outcome = service
            .verify("+1555", &OtpPurpose::Login, "111111")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            VerifyOutcome::InvalidCode {
                remaining_attempts: expected_remaining
            }
        );
    }

    // Sixth call is locked out even with the correct code
    let outcome = service
        .verify("+1555", &OtpPurpose::Login, "482913")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::LockedOut);
    assert!(store.record("+1555", &OtpPurpose::Login).is_none());

    let outcome = service
        .verify("+1555", &OtpPurpose::Login, "482913")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::NotFound);
}

#[tokio::test]
async fn test_correct_code_on_last_attempt_succeeds() {
    let store = Arc::new(MockCredentialStore::new());
    let service = service_with(store.clone(), policy(60, 5));
    store.seed("+1555", OtpPurpose::Login, "482913");

    for _ in 0..4 {
        service
            .verify("+1555", &OtpPurpose::Login, "111111")
            .await
            .unwrap();
    }

    let outcome = service
        .verify("+1555", &OtpPurpose::Login, "482913")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Success);
}

#[tokio::test]
async fn test_expired_record_refused_before_cleanup() {
    let store = Arc::new(MockCredentialStore::new());
    let service = service_with(store.clone(), policy(60, 5));
    store.seed("+1555", OtpPurpose::Login, "482913");
    store.set_expires_at(
        "+1555",
        &OtpPurpose::Login,
        Utc::now() - ChronoDuration::seconds(1),
    );

    let outcome = service
        .verify("+1555", &OtpPurpose::Login, "482913")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Expired);
    assert!(store.record("+1555", &OtpPurpose::Login).is_none());
}

#[tokio::test]
async fn test_verify_without_issue() {
    let service = service_with(Arc::new(MockCredentialStore::new()), policy(60, 5));

    let outcome = service
        .verify("+1555", &OtpPurpose::Login, "482913")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::NotFound);
}

#[tokio::test]
async fn test_purposes_are_independent() {
    let store = Arc::new(MockCredentialStore::new());
    let service = service_with(store.clone(), policy(60, 5));
    store.seed("+1555", OtpPurpose::Login, "482913");
    store.seed("+1555", OtpPurpose::TransactionConfirm, "135790");

    let outcome = service
        .verify("+1555", &OtpPurpose::TransactionConfirm, "482913")
        .await
        .unwrap();
    assert!(matches!(outcome, VerifyOutcome::InvalidCode { .. }));

    let outcome = service
        .verify("+1555", &OtpPurpose::Login, "482913")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Success);

    let outcome = service
        .verify("+1555", &OtpPurpose::TransactionConfirm, "135790")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Success);
}

#[tokio::test]
async fn test_issue_within_cooldown_denied() {
    let service = service_with(Arc::new(MockCredentialStore::new()), policy(60, 5));

    service.issue("+1555", &OtpPurpose::Login).await.unwrap();
    let result = service.issue("+1555", &OtpPurpose::Login).await;

    match result {
        Err(DomainError::Denied {
            retry_after_seconds,
        }) => assert!((59..=60).contains(&retry_after_seconds)),
        other => panic!("expected Denied, got {:?}", other),
    }
}

#[tokio::test]
async fn test_issue_window_cap() {
    let service = service_with(Arc::new(MockCredentialStore::new()), policy(0, 2));

    service.issue("+1555", &OtpPurpose::Login).await.unwrap();
    service.issue("+1555", &OtpPurpose::Login).await.unwrap();

    let err = service.issue("+1555", &OtpPurpose::Login).await.unwrap_err();
    assert!(matches!(err, DomainError::Denied { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_reissue_replaces_previous_code() {
    let store = Arc::new(MockCredentialStore::new());
    let service = service_with(store.clone(), policy(0, 5));

    let first = service.issue("+1555", &OtpPurpose::Login).await.unwrap();
    let second = service.issue("+1555", &OtpPurpose::Login).await.unwrap();
    assert_ne!(first.issuance_id, second.issuance_id);

    let record = store.record("+1555", &OtpPurpose::Login).unwrap();
    assert_eq!(record.id, second.issuance_id);

    let outcome = service
        .verify("+1555", &OtpPurpose::Login, second.code.expose())
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Success);
}

#[tokio::test]
async fn test_superseded_code_rejected_after_concurrent_reissue() {
    let store = Arc::new(MockCredentialStore::new());
    let service = service_with(store.clone(), policy(0, 5));
    store.seed("+1555", OtpPurpose::Login, "111111");
    let fresh = store.reissue_after_next_get("+1555", OtpPurpose::Login, "222222");

    // The old record is loaded, then replaced before the attempt is reserved
    let outcome = service
        .verify("+1555", &OtpPurpose::Login, "111111")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::NotFound);

    let record = store.record("+1555", &OtpPurpose::Login).unwrap();
    assert_eq!(record.id, fresh.id);
    assert_eq!(record.attempts, 0);

    let outcome = service
        .verify("+1555", &OtpPurpose::Login, "222222")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Success);
}

#[tokio::test]
async fn test_wrong_code_of_same_shape() {
    let store = Arc::new(MockCredentialStore::new());
    let service = service_with(store.clone(), policy(60, 5));

    let issued = service.issue("+1555", &OtpPurpose::Login).await.unwrap();
    let outcome = service
        .verify("+1555", &OtpPurpose::Login, &wrong_code(issued.code.expose()))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        VerifyOutcome::InvalidCode {
            remaining_attempts: 4
        }
    );
}

#[tokio::test]
async fn test_store_unavailable_on_issue() {
    let service = service_with(Arc::new(MockCredentialStore::unavailable()), policy(60, 5));

    let err = service.issue("+1555", &OtpPurpose::Login).await.unwrap_err();
    assert!(matches!(err, DomainError::StoreUnavailable { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_failed_store_write_releases_rate_limit() {
    let store = Arc::new(MockCredentialStore::unavailable());
    let service = service_with(store.clone(), policy(60, 1));

    let err = service.issue("+1555", &OtpPurpose::Login).await.unwrap_err();
    assert!(matches!(err, DomainError::StoreUnavailable { .. }));

    let state = service
        .rate_limiter()
        .state("+1555", &OtpPurpose::Login)
        .await
        .unwrap();
    assert_eq!(state.issuance_count_in_window, 0);

    // Neither the cooldown nor the single window slot was spent
    store.unavailable.store(false, Ordering::SeqCst);
    let issued = service.issue("+1555", &OtpPurpose::Login).await.unwrap();
    let outcome = service
        .verify("+1555", &OtpPurpose::Login, issued.code.expose())
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Success);
}

#[tokio::test]
async fn test_store_unavailable_on_verify() {
    let store = Arc::new(MockCredentialStore::new());
    let service = service_with(store.clone(), policy(60, 5));
    store.seed("+1555", OtpPurpose::Login, "482913");
    store.unavailable.store(true, Ordering::SeqCst);

    let err = service
        .verify("+1555", &OtpPurpose::Login, "482913")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::StoreUnavailable { .. }));

    // The record survives the outage
    store.unavailable.store(false, Ordering::SeqCst);
    let outcome = service
        .verify("+1555", &OtpPurpose::Login, "482913")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Success);
}

#[tokio::test]
async fn test_rate_limit_store_unavailable() {
    let store = Arc::new(MockCredentialStore::new());
    let service = OtpService::new(
        store.clone(),
        RateLimiter::new(Arc::new(UnavailableRateLimitStore), policy(60, 5)),
        OtpServiceConfig::default(),
    )
    .unwrap();

    let err = service.issue("+1555", &OtpPurpose::Login).await.unwrap_err();
    assert!(matches!(err, DomainError::StoreUnavailable { .. }));
    assert!(store.record("+1555", &OtpPurpose::Login).is_none());
}

#[tokio::test]
async fn test_corrupt_record_treated_as_not_found() {
    let store = Arc::new(MockCredentialStore::new());
    let service = service_with(store.clone(), policy(0, 5));
    store.seed("+1555", OtpPurpose::Login, "482913");
    store.mark_corrupt("+1555", &OtpPurpose::Login);

    let outcome = service
        .verify("+1555", &OtpPurpose::Login, "482913")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::NotFound);
    assert_eq!(store.invalidations.load(Ordering::SeqCst), 1);

    // Re-issuance recovers
    let issued = service.issue("+1555", &OtpPurpose::Login).await.unwrap();
    let outcome = service
        .verify("+1555", &OtpPurpose::Login, issued.code.expose())
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Success);
}

#[tokio::test]
async fn test_empty_subject_rejected() {
    let service = service_with(Arc::new(MockCredentialStore::new()), policy(60, 5));

    assert!(matches!(
        service.issue("", &OtpPurpose::Login).await,
        Err(DomainError::Validation { .. })
    ));
    assert!(matches!(
        service.verify(" ", &OtpPurpose::Login, "482913").await,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_alphanumeric_codes() {
    let config = OtpServiceConfig {
        code_length: 10,
        alphabet: Alphabet::alphanumeric(),
        ..OtpServiceConfig::default()
    };
    let service = OtpService::new(
        Arc::new(MockCredentialStore::new()),
        RateLimiter::new(
            Arc::new(crate::repositories::InMemoryRateLimitStore::new()),
            policy(60, 5),
        ),
        config,
    )
    .unwrap();

    let issued = service.issue("user-42", &OtpPurpose::Registration).await.unwrap();
    assert_eq!(issued.code.len(), 10);
    assert!(issued
        .code
        .expose()
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

#[test]
fn test_invalid_config_rejected() {
    let config = OtpServiceConfig {
        code_length: 2,
        ..OtpServiceConfig::default()
    };
    let result = OtpService::new(
        Arc::new(MockCredentialStore::new()),
        RateLimiter::new(
            Arc::new(crate::repositories::InMemoryRateLimitStore::new()),
            policy(60, 5),
        ),
        config,
    );
    assert!(matches!(result, Err(DomainError::Validation { .. })));
}
