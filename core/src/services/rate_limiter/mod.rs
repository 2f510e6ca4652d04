//! Issuance cooldowns, rolling-window caps and verification attempt caps
//!
//! Counters live in a [`RateLimitStore`](crate::repositories::RateLimitStore)
//! so every service replica sharing the store sees the same limits.

mod limiter;

#[cfg(test)]
mod tests;

pub use limiter::{RateLimitPolicy, RateLimiter};
