//! In-process credential store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::entities::{OtpPurpose, OtpRecord};
use crate::errors::{StoreError, StoreResult};
use crate::repositories::keys::record_key;

use super::r#trait::CredentialStore;

struct StoredRecord {
    record: OtpRecord,
    evict_at: Instant,
}

/// Credential store held in process memory
///
/// Expired entries are dropped lazily on access, and by [`purge_expired`].
/// Only suitable for a single service instance; state is not shared
/// between replicas.
///
/// [`purge_expired`]: InMemoryCredentialStore::purge_expired
#[derive(Default)]
pub struct InMemoryCredentialStore {
    records: Mutex<HashMap<String, StoredRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, stored| stored.evict_at > now);
        before - records.len()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.records
            .lock()
            .await
            .values()
            .filter(|stored| stored.evict_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn live<'a>(
        records: &'a mut HashMap<String, StoredRecord>,
        key: &str,
    ) -> Option<&'a mut StoredRecord> {
        let expired = match records.get(key) {
            Some(stored) => stored.evict_at <= Instant::now(),
            None => return None,
        };
        if expired {
            records.remove(key);
            return None;
        }
        records.get_mut(key)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn put(&self, record: &OtpRecord, ttl: Duration) -> StoreResult<()> {
        let key = record_key(&record.subject, &record.purpose);
        let stored = StoredRecord {
            record: record.clone(),
            evict_at: Instant::now() + ttl,
        };
        self.records.lock().await.insert(key, stored);
        Ok(())
    }

    async fn get(&self, subject: &str, purpose: &OtpPurpose) -> StoreResult<OtpRecord> {
        let key = record_key(subject, purpose);
        let mut records = self.records.lock().await;
        Self::live(&mut records, &key)
            .map(|stored| stored.record.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn increment_attempts(
        &self,
        subject: &str,
        purpose: &OtpPurpose,
        issuance_id: Uuid,
    ) -> StoreResult<u32> {
        let key = record_key(subject, purpose);
        let mut records = self.records.lock().await;
        let stored = Self::live(&mut records, &key)
            .filter(|stored| stored.record.id == issuance_id)
            .ok_or(StoreError::NotFound)?;
        stored.record.attempts = stored.record.attempts.saturating_add(1);
        Ok(stored.record.attempts)
    }

    async fn invalidate(
        &self,
        subject: &str,
        purpose: &OtpPurpose,
        issuance_id: Uuid,
    ) -> StoreResult<bool> {
        let key = record_key(subject, purpose);
        let mut records = self.records.lock().await;
        let owned = Self::live(&mut records, &key)
            .map_or(false, |stored| stored.record.id == issuance_id);
        if owned {
            records.remove(&key);
        }
        Ok(owned)
    }

    async fn remove(&self, subject: &str, purpose: &OtpPurpose) -> StoreResult<bool> {
        let key = record_key(subject, purpose);
        let mut records = self.records.lock().await;
        let existed = Self::live(&mut records, &key).is_some();
        records.remove(&key);
        Ok(existed)
    }
}
