//! Redis-backed credential store
//!
//! Each record is a hash at `<prefix>:otp:<subject>:<purpose>` that expires
//! at the end of the code TTL, so abandoned codes disappear on their own.
//! Attempt counting and consumption run as scripts that first check the
//! stored `id`, so they only ever touch the issuance the caller loaded.

use async_trait::async_trait;
use redis::{RedisError, Script};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use otp_core::domain::entities::{OtpPurpose, OtpRecord};
use otp_core::errors::{StoreError, StoreResult};
use otp_core::repositories::{record_key, CredentialStore};

use super::record_codec;
use super::redis_client::RedisClient;

const INCREMENT_ATTEMPTS: &str = include_str!("scripts/increment_attempts.lua");
const INVALIDATE: &str = include_str!("scripts/invalidate.lua");

/// Credential store shared by every service instance through Redis
#[derive(Clone)]
pub struct RedisCredentialStore {
    client: RedisClient,
    increment_script: Script,
    invalidate_script: Script,
}

impl RedisCredentialStore {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            increment_script: Script::new(INCREMENT_ATTEMPTS),
            invalidate_script: Script::new(INVALIDATE),
        }
    }

    fn key(&self, subject: &str, purpose: &OtpPurpose) -> String {
        self.client
            .key(&format!("otp:{}", record_key(subject, purpose)))
    }
}

fn unavailable(error: RedisError) -> StoreError {
    StoreError::Unavailable(error.to_string())
}

#[async_trait]
impl CredentialStore for RedisCredentialStore {
    async fn put(&self, record: &OtpRecord, ttl: Duration) -> StoreResult<()> {
        let key = self.key(&record.subject, &record.purpose);
        let fields = record_codec::encode(record);
        let ttl_ms = (ttl.as_millis() as i64).max(1);
        let expire_at_ms = record.issued_at.timestamp_millis().saturating_add(ttl_ms);

        // DEL + HSET + PEXPIREAT in one MULTI/EXEC; replaying it is harmless
        self.client
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                let fields = fields.clone();
                Box::pin(async move {
                    redis::pipe()
                        .atomic()
                        .cmd("DEL")
                        .arg(&key)
                        .ignore()
                        .cmd("HSET")
                        .arg(&key)
                        .arg(fields.as_slice())
                        .ignore()
                        .cmd("PEXPIREAT")
                        .arg(&key)
                        .arg(expire_at_ms)
                        .ignore()
                        .query_async::<_, ()>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(unavailable)?;

        debug!(issuance_id = %record.id, expire_at_ms = expire_at_ms, "Stored OTP record");
        Ok(())
    }

    async fn get(&self, subject: &str, purpose: &OtpPurpose) -> StoreResult<OtpRecord> {
        let key = self.key(subject, purpose);

        let fields = self
            .client
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move {
                    redis::cmd("HGETALL")
                        .arg(&key)
                        .query_async::<_, HashMap<String, String>>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(unavailable)?;

        if fields.is_empty() {
            return Err(StoreError::NotFound);
        }
        record_codec::decode(&fields).map_err(StoreError::CorruptRecord)
    }

    async fn increment_attempts(
        &self,
        subject: &str,
        purpose: &OtpPurpose,
        issuance_id: Uuid,
    ) -> StoreResult<u32> {
        let key = self.key(subject, purpose);
        let script = self.increment_script.clone();
        let id = issuance_id.to_string();

        let attempts = self
            .client
            .execute_once(move |mut conn| {
                Box::pin(async move {
                    script
                        .key(&key)
                        .arg(&id)
                        .invoke_async::<_, i64>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(unavailable)?;

        if attempts < 0 {
            return Err(StoreError::NotFound);
        }
        u32::try_from(attempts)
            .map_err(|_| StoreError::CorruptRecord(format!("attempts out of range: {}", attempts)))
    }

    async fn invalidate(
        &self,
        subject: &str,
        purpose: &OtpPurpose,
        issuance_id: Uuid,
    ) -> StoreResult<bool> {
        let key = self.key(subject, purpose);
        let script = self.invalidate_script.clone();
        let id = issuance_id.to_string();

        // Sent once: a replayed delete would report 0 to the caller that won
        let deleted = self
            .client
            .execute_once(move |mut conn| {
                Box::pin(async move {
                    script
                        .key(&key)
                        .arg(&id)
                        .invoke_async::<_, i64>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(unavailable)?;

        Ok(deleted > 0)
    }

    async fn remove(&self, subject: &str, purpose: &OtpPurpose) -> StoreResult<bool> {
        let key = self.key(subject, purpose);

        let deleted = self
            .client
            .execute_once(move |mut conn| {
                Box::pin(async move { redis::cmd("DEL").arg(&key).query_async::<_, i64>(&mut conn).await })
            })
            .await
            .map_err(unavailable)?;

        Ok(deleted > 0)
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.client
            .health_check()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}
