//! Unit tests for issuance and verification limits

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::OtpPurpose;
use crate::domain::value_objects::{IssuanceDecision, VerificationDecision};
use crate::repositories::InMemoryRateLimitStore;
use crate::services::rate_limiter::{RateLimitPolicy, RateLimiter};

fn limiter(cooldown_secs: u64, max_per_window: u32) -> RateLimiter<InMemoryRateLimitStore> {
    RateLimiter::new(
        Arc::new(InMemoryRateLimitStore::new()),
        RateLimitPolicy {
            cooldown: Duration::from_secs(cooldown_secs),
            window: Duration::from_secs(3600),
            max_issuances_per_window: max_per_window,
            max_attempts: 5,
        },
    )
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_denies_second_issuance() {
    let limiter = limiter(60, 5);

    let first = limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap();
    assert_eq!(first, IssuanceDecision::Allow);

    tokio::time::advance(Duration::from_secs(15)).await;
    let second = limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap();
    assert_eq!(
        second,
        IssuanceDecision::Deny {
            retry_after: Duration::from_secs(45)
        }
    );

    // Other purposes and subjects are independent
    assert_eq!(
        limiter
            .check_issuance("+1555", &OtpPurpose::PasswordReset)
            .await
            .unwrap(),
        IssuanceDecision::Allow
    );
    assert_eq!(
        limiter.check_issuance("+1666", &OtpPurpose::Login).await.unwrap(),
        IssuanceDecision::Allow
    );
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_elapses() {
    let limiter = limiter(60, 5);

    limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap();
    tokio::time::advance(Duration::from_secs(61)).await;

    assert_eq!(
        limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap(),
        IssuanceDecision::Allow
    );
}

#[tokio::test(start_paused = true)]
async fn test_window_cap() {
    let limiter = limiter(60, 3);

    for _ in 0..3 {
        assert_eq!(
            limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap(),
            IssuanceDecision::Allow
        );
        tokio::time::advance(Duration::from_secs(61)).await;
    }

    // 183s into the window
    match limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap() {
        IssuanceDecision::Deny { retry_after } => {
            assert_eq!(retry_after, Duration::from_secs(3600 - 183));
        }
        other => panic!("expected deny, got {:?}", other),
    }

    tokio::time::advance(Duration::from_secs(3600)).await;
    assert_eq!(
        limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap(),
        IssuanceDecision::Allow
    );
}

#[tokio::test(start_paused = true)]
async fn test_zero_cooldown_only_counts_window() {
    let limiter = limiter(0, 2);

    assert_eq!(
        limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap(),
        IssuanceDecision::Allow
    );
    assert_eq!(
        limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap(),
        IssuanceDecision::Allow
    );
    assert!(matches!(
        limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap(),
        IssuanceDecision::Deny { .. }
    ));
}

#[test]
fn test_check_verification() {
    let limiter = limiter(60, 5);

    assert_eq!(
        limiter.check_verification("+1555", &OtpPurpose::Login, 0),
        VerificationDecision::Allow
    );
    assert_eq!(
        limiter.check_verification("+1555", &OtpPurpose::Login, 4),
        VerificationDecision::Allow
    );
    assert_eq!(
        limiter.check_verification("+1555", &OtpPurpose::Login, 5),
        VerificationDecision::Deny
    );
    assert_eq!(
        limiter.check_verification("+1555", &OtpPurpose::Login, 9),
        VerificationDecision::Deny
    );
}

#[tokio::test(start_paused = true)]
async fn test_state_and_reset() {
    let limiter = limiter(60, 5);

    limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap();
    let state = limiter.state("+1555", &OtpPurpose::Login).await.unwrap();
    assert_eq!(state.issuance_count_in_window, 1);
    assert!(state.last_issued_at.is_some());

    limiter.reset("+1555", &OtpPurpose::Login).await.unwrap();
    let state = limiter.state("+1555", &OtpPurpose::Login).await.unwrap();
    assert_eq!(state.issuance_count_in_window, 0);

    // Reset also lifts the cooldown
    assert_eq!(
        limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap(),
        IssuanceDecision::Allow
    );
}

#[tokio::test(start_paused = true)]
async fn test_release_issuance_returns_claim() {
    let limiter = limiter(60, 1);
    let issued_at = Utc::now();

    let decision = limiter
        .check_issuance_at("+1555", &OtpPurpose::Login, issued_at)
        .await
        .unwrap();
    assert_eq!(decision, IssuanceDecision::Allow);

    limiter
        .release_issuance("+1555", &OtpPurpose::Login, issued_at)
        .await
        .unwrap();

    assert_eq!(
        limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap(),
        IssuanceDecision::Allow
    );
    assert!(matches!(
        limiter.check_issuance("+1555", &OtpPurpose::Login).await.unwrap(),
        IssuanceDecision::Deny { .. }
    ));
}
