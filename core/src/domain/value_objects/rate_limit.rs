//! Rate-limit decisions and counters.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Decision for an issuance request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuanceDecision {
    Allow,
    Deny { retry_after: Duration },
}

/// Decision for a verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationDecision {
    Allow,
    Deny,
}

/// Result of trying to open an issuance cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    /// No cooldown was running; one has now been started
    Started,
    /// A cooldown is already running
    Active { retry_after: Duration },
}

/// Issuance counter for the current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    /// Issuances counted so far, including the current one
    pub count: u32,
    /// Time until the window resets
    pub resets_in: Duration,
}

/// Snapshot of the limiter state for one (subject, purpose)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RateLimitState {
    /// When the last counted issuance happened in the current window
    pub last_issued_at: Option<DateTime<Utc>>,
    /// Issuances counted in the current window
    pub issuance_count_in_window: u32,
    /// Time until the current window resets
    pub window_resets_in: Option<Duration>,
}
