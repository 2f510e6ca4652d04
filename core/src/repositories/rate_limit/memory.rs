//! In-process rate-limit store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::value_objects::{CooldownStatus, RateLimitState, WindowCount};
use crate::errors::StoreResult;

use super::r#trait::RateLimitStore;

struct Cooldown {
    until: Instant,
    started_at: DateTime<Utc>,
}

struct Window {
    count: u32,
    last_issued_at: DateTime<Utc>,
    resets_at: Instant,
}

#[derive(Default)]
struct Counters {
    cooldowns: HashMap<String, Cooldown>,
    windows: HashMap<String, Window>,
}

impl Counters {
    fn purge(&mut self, now: Instant) -> usize {
        let before = self.cooldowns.len() + self.windows.len();
        self.cooldowns.retain(|_, cooldown| cooldown.until > now);
        self.windows.retain(|_, window| window.resets_at > now);
        before - (self.cooldowns.len() + self.windows.len())
    }
}

/// Rate-limit store held in process memory
///
/// A single mutex makes every primitive atomic. Expired cooldowns and
/// windows of every key are dropped on each write, so keys that are never
/// used again do not accumulate.
#[derive(Default)]
pub struct InMemoryRateLimitStore {
    counters: Mutex<Counters>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        self.counters.lock().await.purge(Instant::now())
    }

    /// Number of cooldown and window entries currently held
    pub async fn tracked_entries(&self) -> usize {
        let counters = self.counters.lock().await;
        counters.cooldowns.len() + counters.windows.len()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn try_start_cooldown(
        &self,
        key: &str,
        issued_at: DateTime<Utc>,
        cooldown: Duration,
    ) -> StoreResult<CooldownStatus> {
        let now = Instant::now();
        let mut counters = self.counters.lock().await;
        counters.purge(now);

        if let Some(active) = counters.cooldowns.get(key) {
            return Ok(CooldownStatus::Active {
                retry_after: active.until - now,
            });
        }

        counters.cooldowns.insert(
            key.to_string(),
            Cooldown {
                until: now + cooldown,
                started_at: issued_at,
            },
        );
        Ok(CooldownStatus::Started)
    }

    async fn increment_window(
        &self,
        key: &str,
        issued_at: DateTime<Utc>,
        window: Duration,
    ) -> StoreResult<WindowCount> {
        let now = Instant::now();
        let mut counters = self.counters.lock().await;
        counters.purge(now);

        let entry = counters
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window {
                count: 0,
                last_issued_at: issued_at,
                resets_at: now + window,
            });
        entry.count = entry.count.saturating_add(1);
        entry.last_issued_at = issued_at;

        Ok(WindowCount {
            count: entry.count,
            resets_in: entry.resets_at - now,
        })
    }

    async fn release_issuance(&self, key: &str, issued_at: DateTime<Utc>) -> StoreResult<()> {
        let now = Instant::now();
        let mut counters = self.counters.lock().await;
        counters.purge(now);

        if counters
            .cooldowns
            .get(key)
            .map_or(false, |cooldown| cooldown.started_at == issued_at)
        {
            counters.cooldowns.remove(key);
        }

        let emptied = match counters.windows.get_mut(key) {
            Some(window) => {
                window.count = window.count.saturating_sub(1);
                window.count == 0
            }
            None => false,
        };
        if emptied {
            counters.windows.remove(key);
        }
        Ok(())
    }

    async fn load_state(&self, key: &str) -> StoreResult<RateLimitState> {
        let now = Instant::now();
        let counters = self.counters.lock().await;

        Ok(match counters.windows.get(key) {
            Some(window) if window.resets_at > now => RateLimitState {
                last_issued_at: Some(window.last_issued_at),
                issuance_count_in_window: window.count,
                window_resets_in: Some(window.resets_at - now),
            },
            _ => RateLimitState::default(),
        })
    }

    async fn reset(&self, key: &str) -> StoreResult<()> {
        let mut counters = self.counters.lock().await;
        counters.cooldowns.remove(key);
        counters.windows.remove(key);
        Ok(())
    }
}
