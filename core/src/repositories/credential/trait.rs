//! Credential store trait defining persistence of OTP records.
//!
//! Implementations must make every operation atomic with respect to other
//! callers sharing the same store: several stateless service instances may
//! operate on the same (subject, purpose) key concurrently.

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entities::{OtpPurpose, OtpRecord};
use crate::errors::StoreResult;

/// Persistence contract for OTP records
///
/// # Errors
///
/// * `StoreError::Unavailable` - the backing store cannot be reached
/// * `StoreError::NotFound` - no live record exists for the key
/// * `StoreError::CorruptRecord` - a record exists but cannot be decoded
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Upsert the record for its (subject, purpose), replacing any prior one
    ///
    /// The store expires the record after `ttl` without explicit cleanup.
    /// The write is all-or-nothing: readers see the old record or the new
    /// one, never a mix.
    async fn put(&self, record: &OtpRecord, ttl: Duration) -> StoreResult<()>;

    /// Load the live record for (subject, purpose)
    async fn get(&self, subject: &str, purpose: &OtpPurpose) -> StoreResult<OtpRecord>;

    /// Atomically increment the attempt counter of issuance `issuance_id`
    /// and return the new value
    ///
    /// Fails with `NotFound` when the key is gone or now holds a different
    /// issuance. Must not resurrect a record that was deleted or expired.
    async fn increment_attempts(
        &self,
        subject: &str,
        purpose: &OtpPurpose,
        issuance_id: Uuid,
    ) -> StoreResult<u32>;

    /// Delete the record of issuance `issuance_id`
    ///
    /// Returns `true` only for the caller that actually removed it, so that
    /// two concurrent consumers cannot both claim the same record. A newer
    /// issuance stored under the same key is left untouched.
    async fn invalidate(
        &self,
        subject: &str,
        purpose: &OtpPurpose,
        issuance_id: Uuid,
    ) -> StoreResult<bool>;

    /// Delete whatever is stored for (subject, purpose)
    ///
    /// Used for entries that cannot be decoded and so have no known issuance.
    async fn remove(&self, subject: &str, purpose: &OtpPurpose) -> StoreResult<bool>;

    /// Check connectivity to the backing store
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
