//! OTP service implementation

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use otp_shared::mask_subject;

use crate::domain::entities::{OtpPurpose, OtpRecord};
use crate::domain::value_objects::{
    IssuanceDecision, IssuedOtp, OtpCode, VerificationDecision, VerifyOutcome,
};
use crate::errors::{DomainError, DomainResult, StoreError};
use crate::repositories::{CredentialStore, RateLimitStore};
use crate::services::code_generator::CodeGenerator;
use crate::services::hashing::CodeHasher;
use crate::services::rate_limiter::RateLimiter;

use super::config::OtpServiceConfig;

/// Issues and verifies one-time codes
///
/// Holds no per-key state of its own: every mutation goes through the
/// store's atomic primitives, so any number of instances may share a store.
pub struct OtpService<S: CredentialStore + ?Sized, L: RateLimitStore + ?Sized> {
    store: Arc<S>,
    rate_limiter: RateLimiter<L>,
    generator: CodeGenerator,
    hasher: CodeHasher,
    ttl: Duration,
    record_ttl: chrono::Duration,
}

impl<S: CredentialStore + ?Sized, L: RateLimitStore + ?Sized> OtpService<S, L> {
    /// Create a new OTP service
    ///
    /// # Arguments
    ///
    /// * `store` - Credential store holding the hashed records
    /// * `rate_limiter` - Issuance and attempt limits
    /// * `config` - Code shape and lifetime
    pub fn new(
        store: Arc<S>,
        rate_limiter: RateLimiter<L>,
        config: OtpServiceConfig,
    ) -> DomainResult<Self> {
        let generator = CodeGenerator::new(config.code_length, config.alphabet)?;
        let record_ttl = chrono::Duration::from_std(config.ttl).map_err(|e| {
            DomainError::Validation {
                message: format!("ttl out of range: {}", e),
            }
        })?;

        Ok(Self {
            store,
            rate_limiter,
            generator,
            hasher: CodeHasher::new(),
            ttl: config.ttl,
            record_ttl,
        })
    }

    pub fn rate_limiter(&self) -> &RateLimiter<L> {
        &self.rate_limiter
    }

    /// Issue a new code for (subject, purpose)
    ///
    /// This method:
    /// 1. Checks the issuance limits
    /// 2. Generates a code and hashes it under a fresh salt
    /// 3. Stores the record with the configured TTL, replacing any prior one
    ///
    /// The raw code is returned to the caller only; it is never stored or
    /// logged.
    ///
    /// # Errors
    ///
    /// * `DomainError::Validation` - empty subject
    /// * `DomainError::Denied` - rate limited
    /// * `DomainError::StoreUnavailable` - no record was written and the
    ///   issuance claim was released
    pub async fn issue(&self, subject: &str, purpose: &OtpPurpose) -> DomainResult<IssuedOtp> {
        validate_subject(subject)?;
        let masked = mask_subject(subject);

        let issued_at = Utc::now();
        let decision = self
            .rate_limiter
            .check_issuance_at(subject, purpose, issued_at)
            .await
            .map_err(|e| {
                tracing::error!(
                    subject = %masked,
                    purpose = %purpose,
                    error = %e,
                    event = "rate_limit_check_failed",
                    "Failed to check issuance limits"
                );
                e
            })?;

        if let IssuanceDecision::Deny { retry_after } = decision {
            return Err(DomainError::Denied {
                retry_after_seconds: ceil_seconds(retry_after),
            });
        }

        let code = self.generator.generate();
        let salt = self.hasher.new_salt();
        let code_hash = self.hasher.hash(&salt, code.expose());
        let record = OtpRecord::new(
            subject,
            purpose.clone(),
            code_hash,
            salt,
            issued_at,
            self.record_ttl,
        );

        if let Err(e) = self.store.put(&record, self.ttl).await {
            tracing::error!(
                subject = %masked,
                purpose = %purpose,
                error = %e,
                event = "otp_storage_failed",
                "Failed to store OTP record"
            );
            // No code exists, so the cooldown and window slot go back
            if let Err(release_error) = self
                .rate_limiter
                .release_issuance(subject, purpose, issued_at)
                .await
            {
                tracing::warn!(
                    subject = %masked,
                    purpose = %purpose,
                    error = %release_error,
                    event = "rate_limit_release_failed",
                    "Failed to release issuance claim"
                );
            }
            return Err(DomainError::from(e));
        }

        tracing::info!(
            subject = %masked,
            purpose = %purpose,
            issuance_id = %record.id,
            expires_at = %record.expires_at,
            event = "otp_issued",
            "Issued one-time code"
        );

        Ok(IssuedOtp {
            code,
            expires_at: record.expires_at,
            issuance_id: record.id,
        })
    }

    /// Verify a supplied code for (subject, purpose)
    ///
    /// An attempt is reserved with the store's atomic increment before the
    /// hash comparison, so concurrent guesses cannot share an attempt slot.
    /// A match only counts as `Success` for the caller whose invalidation
    /// removed the record.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures are errors; every verification result,
    /// including lockout, is a `VerifyOutcome`.
    pub async fn verify(
        &self,
        subject: &str,
        purpose: &OtpPurpose,
        supplied_code: &str,
    ) -> DomainResult<VerifyOutcome> {
        validate_subject(subject)?;
        let supplied = OtpCode::new(supplied_code);

        let record = match self.store.get(subject, purpose).await {
            Ok(record) => record,
            Err(StoreError::NotFound) => {
                return Ok(self.finish(subject, purpose, None, VerifyOutcome::NotFound))
            }
            Err(StoreError::CorruptRecord(reason)) => {
                tracing::warn!(
                    subject = %mask_subject(subject),
                    purpose = %purpose,
                    reason = %reason,
                    event = "otp_record_corrupt",
                    "Discarding undecodable OTP record"
                );
                self.discard(subject, purpose, None).await;
                return Ok(self.finish(subject, purpose, None, VerifyOutcome::NotFound));
            }
            Err(e) => return Err(self.unavailable(subject, purpose, e)),
        };

        if record.consumed {
            return Ok(self.finish(subject, purpose, Some(&record), VerifyOutcome::NotFound));
        }

        if record.is_expired_at(Utc::now()) {
            self.discard(subject, purpose, Some(record.id)).await;
            return Ok(self.finish(subject, purpose, Some(&record), VerifyOutcome::Expired));
        }

        if self
            .rate_limiter
            .check_verification(subject, purpose, record.attempts)
            == VerificationDecision::Deny
        {
            self.discard(subject, purpose, Some(record.id)).await;
            return Ok(self.finish(subject, purpose, Some(&record), VerifyOutcome::LockedOut));
        }

        // Bound to this issuance: a reissue since `get` makes the record
        // unreachable rather than lending it the old hash
        let reserved = match self
            .store
            .increment_attempts(subject, purpose, record.id)
            .await
        {
            Ok(attempts) => attempts,
            Err(StoreError::NotFound) => {
                return Ok(self.finish(subject, purpose, Some(&record), VerifyOutcome::NotFound))
            }
            Err(StoreError::CorruptRecord(_)) => {
                self.discard(subject, purpose, Some(record.id)).await;
                return Ok(self.finish(subject, purpose, Some(&record), VerifyOutcome::NotFound));
            }
            Err(e) => return Err(self.unavailable(subject, purpose, e)),
        };

        // Attempts before this one must still be under the cap
        if self
            .rate_limiter
            .check_verification(subject, purpose, reserved.saturating_sub(1))
            == VerificationDecision::Deny
        {
            self.discard(subject, purpose, Some(record.id)).await;
            return Ok(self.finish(subject, purpose, Some(&record), VerifyOutcome::LockedOut));
        }

        if !self
            .hasher
            .matches(&record.salt, &supplied, &record.code_hash)
        {
            let remaining_attempts = self
                .rate_limiter
                .policy()
                .max_attempts
                .saturating_sub(reserved);
            return Ok(self.finish(
                subject,
                purpose,
                Some(&record),
                VerifyOutcome::InvalidCode { remaining_attempts },
            ));
        }

        let outcome = match self.store.invalidate(subject, purpose, record.id).await {
            Ok(true) => VerifyOutcome::Success,
            // Consumed by another caller, or replaced by a newer issuance
            Ok(false) => VerifyOutcome::NotFound,
            Err(e) => return Err(self.unavailable(subject, purpose, e)),
        };
        Ok(self.finish(subject, purpose, Some(&record), outcome))
    }

    /// Best-effort removal; the store TTL still bounds the record's lifetime
    ///
    /// With an `issuance_id` only that issuance is removed. Without one the
    /// key is cleared, which is reserved for undecodable entries.
    async fn discard(&self, subject: &str, purpose: &OtpPurpose, issuance_id: Option<Uuid>) {
        let result = match issuance_id {
            Some(id) => self.store.invalidate(subject, purpose, id).await,
            None => self.store.remove(subject, purpose).await,
        };
        if let Err(e) = result {
            tracing::error!(
                subject = %mask_subject(subject),
                purpose = %purpose,
                error = %e,
                event = "otp_invalidate_failed",
                "Failed to invalidate OTP record"
            );
        }
    }

    fn unavailable(&self, subject: &str, purpose: &OtpPurpose, error: StoreError) -> DomainError {
        tracing::error!(
            subject = %mask_subject(subject),
            purpose = %purpose,
            error = %error,
            event = "credential_store_unavailable",
            "Credential store failed during verification"
        );
        DomainError::from(error)
    }

    fn finish(
        &self,
        subject: &str,
        purpose: &OtpPurpose,
        record: Option<&OtpRecord>,
        outcome: VerifyOutcome,
    ) -> VerifyOutcome {
        let issuance_id = record.map(|r| r.id.to_string()).unwrap_or_default();

        match outcome {
            VerifyOutcome::Success => tracing::info!(
                subject = %mask_subject(subject),
                purpose = %purpose,
                issuance_id = %issuance_id,
                outcome = outcome.as_str(),
                event = "otp_verified",
                "One-time code verified"
            ),
            VerifyOutcome::InvalidCode { remaining_attempts } => tracing::warn!(
                subject = %mask_subject(subject),
                purpose = %purpose,
                issuance_id = %issuance_id,
                outcome = outcome.as_str(),
                remaining_attempts = remaining_attempts,
                event = "otp_verification_failed",
                "One-time code rejected"
            ),
            _ => tracing::warn!(
                subject = %mask_subject(subject),
                purpose = %purpose,
                issuance_id = %issuance_id,
                outcome = outcome.as_str(),
                event = "otp_verification_failed",
                "One-time code rejected"
            ),
        }

        outcome
    }
}

fn validate_subject(subject: &str) -> DomainResult<()> {
    if subject.trim().is_empty() {
        return Err(DomainError::Validation {
            message: "subject must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Whole seconds, rounded up, never below one
fn ceil_seconds(duration: Duration) -> u64 {
    let seconds = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    seconds.max(1)
}
