//! Rate-limit store trait.
//!
//! Counters are keyed by `record_key(subject, purpose)` and carry their own
//! expiry, so stale windows and cooldowns disappear without cleanup jobs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::domain::value_objects::{CooldownStatus, RateLimitState, WindowCount};
use crate::errors::StoreResult;

/// Atomic counter primitives backing the rate limiter
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Start a cooldown of length `cooldown` unless one is already running
    ///
    /// Set-if-absent: of several concurrent callers exactly one observes
    /// `Started`.
    async fn try_start_cooldown(
        &self,
        key: &str,
        issued_at: DateTime<Utc>,
        cooldown: Duration,
    ) -> StoreResult<CooldownStatus>;

    /// Count one issuance in the current window
    ///
    /// The first increment opens a window of length `window`; later
    /// increments do not extend it.
    async fn increment_window(
        &self,
        key: &str,
        issued_at: DateTime<Utc>,
        window: Duration,
    ) -> StoreResult<WindowCount>;

    /// Undo an issuance counted at `issued_at` that never produced a record
    ///
    /// Clears the cooldown only while it is still the one started at
    /// `issued_at`, and takes one issuance off the current window.
    async fn release_issuance(&self, key: &str, issued_at: DateTime<Utc>) -> StoreResult<()>;

    /// Read the current counters without modifying them
    async fn load_state(&self, key: &str) -> StoreResult<RateLimitState>;

    /// Drop the cooldown and window for `key`
    async fn reset(&self, key: &str) -> StoreResult<()>;
}
