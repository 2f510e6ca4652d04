//! Redis-backed rate-limit counters
//!
//! Keys:
//! - `<prefix>:rl:cooldown:<key>` string set with NX and a PX expiry
//! - `<prefix>:rl:window:<key>` hash with `count` and `last_issued_at`,
//!   expiring when the window ends
//!
//! The cooldown value is the issued-at millis of the claim that started it,
//! which lets a failed issuance release only its own cooldown.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::{RedisError, Script};
use std::collections::HashMap;
use std::time::Duration;

use otp_core::domain::value_objects::{CooldownStatus, RateLimitState, WindowCount};
use otp_core::errors::{StoreError, StoreResult};
use otp_core::repositories::RateLimitStore;

use super::redis_client::RedisClient;

const START_COOLDOWN: &str = include_str!("scripts/start_cooldown.lua");
const INCREMENT_WINDOW: &str = include_str!("scripts/increment_window.lua");
const RELEASE_ISSUANCE: &str = include_str!("scripts/release_issuance.lua");

#[derive(Clone)]
pub struct RedisRateLimitStore {
    client: RedisClient,
    cooldown_script: Script,
    window_script: Script,
    release_script: Script,
}

impl RedisRateLimitStore {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            cooldown_script: Script::new(START_COOLDOWN),
            window_script: Script::new(INCREMENT_WINDOW),
            release_script: Script::new(RELEASE_ISSUANCE),
        }
    }

    fn cooldown_key(&self, key: &str) -> String {
        self.client.key(&format!("rl:cooldown:{}", key))
    }

    fn window_key(&self, key: &str) -> String {
        self.client.key(&format!("rl:window:{}", key))
    }
}

fn unavailable(error: RedisError) -> StoreError {
    StoreError::Unavailable(error.to_string())
}

fn millis(duration: Duration) -> u64 {
    (duration.as_millis() as u64).max(1)
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn try_start_cooldown(
        &self,
        key: &str,
        issued_at: DateTime<Utc>,
        cooldown: Duration,
    ) -> StoreResult<CooldownStatus> {
        let key = self.cooldown_key(key);
        let script = self.cooldown_script.clone();
        let issued_ms = issued_at.timestamp_millis();
        let cooldown_ms = millis(cooldown);

        let remaining = self
            .client
            .execute_once(move |mut conn| {
                Box::pin(async move {
                    script
                        .key(&key)
                        .arg(issued_ms)
                        .arg(cooldown_ms)
                        .invoke_async::<_, i64>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(unavailable)?;

        if remaining < 0 {
            Ok(CooldownStatus::Started)
        } else {
            Ok(CooldownStatus::Active {
                retry_after: Duration::from_millis(remaining as u64),
            })
        }
    }

    async fn increment_window(
        &self,
        key: &str,
        issued_at: DateTime<Utc>,
        window: Duration,
    ) -> StoreResult<WindowCount> {
        let key = self.window_key(key);
        let script = self.window_script.clone();
        let issued_ms = issued_at.timestamp_millis();
        let window_ms = millis(window);

        let (count, remaining_ms) = self
            .client
            .execute_once(move |mut conn| {
                Box::pin(async move {
                    script
                        .key(&key)
                        .arg(issued_ms)
                        .arg(window_ms)
                        .invoke_async::<_, (i64, i64)>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(unavailable)?;

        Ok(WindowCount {
            count: u32::try_from(count).unwrap_or(u32::MAX),
            resets_in: Duration::from_millis(remaining_ms.max(0) as u64),
        })
    }

    async fn release_issuance(&self, key: &str, issued_at: DateTime<Utc>) -> StoreResult<()> {
        let cooldown_key = self.cooldown_key(key);
        let window_key = self.window_key(key);
        let script = self.release_script.clone();
        let issued_ms = issued_at.timestamp_millis();

        self.client
            .execute_once(move |mut conn| {
                Box::pin(async move {
                    script
                        .key(&cooldown_key)
                        .key(&window_key)
                        .arg(issued_ms)
                        .invoke_async::<_, i64>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(unavailable)?;

        Ok(())
    }

    async fn load_state(&self, key: &str) -> StoreResult<RateLimitState> {
        let key = self.window_key(key);

        let (fields, remaining_ms) = self
            .client
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move {
                    redis::pipe()
                        .cmd("HGETALL")
                        .arg(&key)
                        .cmd("PTTL")
                        .arg(&key)
                        .query_async::<_, (HashMap<String, String>, i64)>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(unavailable)?;

        if fields.is_empty() {
            return Ok(RateLimitState::default());
        }

        let count = fields
            .get("count")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        let last_issued_at = fields
            .get("last_issued_at")
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        Ok(RateLimitState {
            last_issued_at,
            issuance_count_in_window: count,
            window_resets_in: (remaining_ms >= 0).then(|| Duration::from_millis(remaining_ms as u64)),
        })
    }

    async fn reset(&self, key: &str) -> StoreResult<()> {
        let keys = vec![self.cooldown_key(key), self.window_key(key)];

        self.client
            .execute_with_retry(|mut conn| {
                let keys = keys.clone();
                Box::pin(async move {
                    redis::cmd("DEL")
                        .arg(keys.as_slice())
                        .query_async::<_, i64>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(unavailable)?;

        Ok(())
    }
}
