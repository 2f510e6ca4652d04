//! Rate limiter implementation

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use otp_shared::{mask_subject, RateLimitConfig};

use crate::domain::entities::OtpPurpose;
use crate::domain::value_objects::{
    CooldownStatus, IssuanceDecision, RateLimitState, VerificationDecision,
};
use crate::errors::DomainResult;
use crate::repositories::{record_key, RateLimitStore};

/// Limits enforced by [`RateLimiter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Minimum interval between issuances; zero disables it
    pub cooldown: Duration,
    /// Length of the issuance counting window
    pub window: Duration,
    /// Issuances allowed per window
    pub max_issuances_per_window: u32,
    /// Verification attempts allowed per record
    pub max_attempts: u32,
}

impl RateLimitPolicy {
    pub fn from_config(config: &RateLimitConfig, max_attempts: u32) -> Self {
        Self {
            cooldown: Duration::from_secs(config.issuance_cooldown_seconds),
            window: Duration::from_secs(config.window_seconds),
            max_issuances_per_window: config.max_issuances_per_window,
            max_attempts,
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default(), 5)
    }
}

/// Per (subject, purpose) abuse guard
pub struct RateLimiter<L: RateLimitStore + ?Sized> {
    store: Arc<L>,
    policy: RateLimitPolicy,
}

impl<L: RateLimitStore + ?Sized> RateLimiter<L> {
    pub fn new(store: Arc<L>, policy: RateLimitPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Decide whether a new code may be issued now
    ///
    /// See [`RateLimiter::check_issuance_at`].
    pub async fn check_issuance(
        &self,
        subject: &str,
        purpose: &OtpPurpose,
    ) -> DomainResult<IssuanceDecision> {
        self.check_issuance_at(subject, purpose, Utc::now()).await
    }

    /// Decide whether a code issued at `now` may be issued
    ///
    /// The cooldown is claimed first with an atomic set-if-absent, then the
    /// issuance is counted in the current window. Both steps mutate shared
    /// counters, so an allowed decision is already accounted for; hand the
    /// same `now` to [`RateLimiter::release_issuance`] if no code results.
    ///
    /// # Errors
    ///
    /// `DomainError::StoreUnavailable` when the counters cannot be reached.
    pub async fn check_issuance_at(
        &self,
        subject: &str,
        purpose: &OtpPurpose,
        now: DateTime<Utc>,
    ) -> DomainResult<IssuanceDecision> {
        let key = record_key(subject, purpose);

        if !self.policy.cooldown.is_zero() {
            let status = self
                .store
                .try_start_cooldown(&key, now, self.policy.cooldown)
                .await?;

            if let CooldownStatus::Active { retry_after } = status {
                tracing::warn!(
                    subject = %mask_subject(subject),
                    purpose = %purpose,
                    retry_after_ms = retry_after.as_millis() as u64,
                    event = "issuance_cooldown_active",
                    "Issuance requested during cooldown"
                );
                return Ok(IssuanceDecision::Deny { retry_after });
            }
        }

        let window = self
            .store
            .increment_window(&key, now, self.policy.window)
            .await?;

        if window.count > self.policy.max_issuances_per_window {
            let retry_after = window.resets_in.max(Duration::from_secs(1));
            tracing::warn!(
                subject = %mask_subject(subject),
                purpose = %purpose,
                count = window.count,
                limit = self.policy.max_issuances_per_window,
                retry_after_ms = retry_after.as_millis() as u64,
                event = "issuance_window_exceeded",
                "Issuance window cap reached"
            );
            return Ok(IssuanceDecision::Deny { retry_after });
        }

        Ok(IssuanceDecision::Allow)
    }

    /// Give back an allowed issuance whose record was never stored
    pub async fn release_issuance(
        &self,
        subject: &str,
        purpose: &OtpPurpose,
        issued_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.store
            .release_issuance(&record_key(subject, purpose), issued_at)
            .await?;

        tracing::info!(
            subject = %mask_subject(subject),
            purpose = %purpose,
            event = "issuance_released",
            "Released issuance claim"
        );
        Ok(())
    }

    /// Deny once `current_attempts` has reached the attempt cap
    pub fn check_verification(
        &self,
        subject: &str,
        purpose: &OtpPurpose,
        current_attempts: u32,
    ) -> VerificationDecision {
        if current_attempts >= self.policy.max_attempts {
            tracing::warn!(
                subject = %mask_subject(subject),
                purpose = %purpose,
                attempts = current_attempts,
                max_attempts = self.policy.max_attempts,
                event = "verification_attempts_exhausted",
                "Verification attempt cap reached"
            );
            VerificationDecision::Deny
        } else {
            VerificationDecision::Allow
        }
    }

    /// Current counters for (subject, purpose)
    pub async fn state(&self, subject: &str, purpose: &OtpPurpose) -> DomainResult<RateLimitState> {
        Ok(self.store.load_state(&record_key(subject, purpose)).await?)
    }

    /// Clear cooldown and window counters for (subject, purpose)
    pub async fn reset(&self, subject: &str, purpose: &OtpPurpose) -> DomainResult<()> {
        self.store.reset(&record_key(subject, purpose)).await?;

        tracing::info!(
            subject = %mask_subject(subject),
            purpose = %purpose,
            event = "rate_limit_reset",
            "Rate limit counters cleared"
        );
        Ok(())
    }
}
