//! Cache Store Module
//!
//! TTL-keyed storage with hit accounting and batched cleanup on top of a
//! [`StorageBackend`]. Expiry is lazy: `get` hides expired rows without
//! deleting them, and `clean_expired` reclaims them in bounded batches.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{
    CacheEntry, CacheStats, Clock, EntryId, InMemoryBackend, LookupMetrics, LookupSnapshot,
    QueryType, StorageBackend, SystemClock, CLEANUP_BATCH_SIZE, MAX_KEY_LENGTH,
};
use crate::error::{CacheError, Result};

// == Cache Hit ==
/// A live entry returned by [`CacheStore::get`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    pub payload: Value,
    pub hit_count: u64,
    pub created_at: u64,
}

// == Cleanup Outcome ==
/// Result of one `clean_expired` batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub deleted: usize,
    /// The batch was full; more expired rows may remain
    pub has_more: bool,
}

// == Cache Store ==
/// Query cache storage with per-type TTLs.
#[derive(Debug)]
pub struct CacheStore {
    backend: Box<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    metrics: LookupMetrics,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    // == Constructors ==
    /// Creates an in-memory store on the system clock.
    pub fn new() -> Self {
        Self::with_backend(InMemoryBackend::new(), Arc::new(SystemClock))
    }

    /// Creates a store over an arbitrary backend and clock.
    pub fn with_backend(backend: impl StorageBackend + 'static, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend: Box::new(backend),
            clock,
            metrics: LookupMetrics::new(),
        }
    }

    /// Current time according to the store's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // == Get ==
    /// Looks up a live entry.
    ///
    /// Absent, expired and undeserializable entries all read as `None`.
    /// Nothing is written on this path.
    pub fn get(&self, key: &str) -> Result<Option<CacheHit>> {
        let Some(entry) = self.live_entry(key)? else {
            return Ok(None);
        };

        match serde_json::from_str::<Value>(&entry.payload) {
            Ok(payload) => {
                self.metrics.record_hit();
                Ok(Some(CacheHit {
                    payload,
                    hit_count: entry.hit_count,
                    created_at: entry.created_at,
                }))
            }
            Err(err) => {
                warn!(cache_key = %key, error = %err, "Unreadable cache payload, treating as miss");
                self.metrics.record_unreadable();
                Ok(None)
            }
        }
    }

    /// Looks up a live entry and deserializes its payload into `T`.
    ///
    /// A payload that does not fit `T` is a miss.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(entry) = self.live_entry(key)? else {
            return Ok(None);
        };

        match serde_json::from_str::<T>(&entry.payload) {
            Ok(value) => {
                self.metrics.record_hit();
                Ok(Some(value))
            }
            Err(err) => {
                warn!(cache_key = %key, error = %err, "Cache payload has unexpected shape, treating as miss");
                self.metrics.record_unreadable();
                Ok(None)
            }
        }
    }

    fn live_entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        let now = self.now_ms();
        match self.backend.get(key)? {
            Some(entry) if !entry.is_expired(now) => Ok(Some(entry)),
            Some(_) => {
                debug!(cache_key = %key, "Cache entry expired");
                self.metrics.record_miss();
                Ok(None)
            }
            None => {
                self.metrics.record_miss();
                Ok(None)
            }
        }
    }

    // == Set ==
    /// Serializes `payload` and upserts it under `key`.
    pub fn set<P: Serialize + ?Sized>(
        &mut self,
        key: &str,
        query_type: QueryType,
        payload: &P,
    ) -> Result<EntryId> {
        let payload = serde_json::to_string(payload)?;
        self.set_raw(key, query_type, payload)
    }

    /// Upserts an already serialized payload.
    ///
    /// An existing row keeps its id, `created_at` and `hit_count`; its payload
    /// and expiry are replaced. A new row starts with zero hits.
    pub fn set_raw(&mut self, key: &str, query_type: QueryType, payload: String) -> Result<EntryId> {
        validate_key(key)?;

        let now = self.now_ms();
        let entry = match self.backend.get(key)? {
            Some(mut existing) => {
                existing.refresh(query_type, payload, now);
                existing
            }
            None => CacheEntry::new(key, query_type, payload, now),
        };
        let id = entry.id;
        debug!(cache_key = %key, %query_type, expires_at = entry.expires_at, "Cache entry written");
        self.backend.put(entry)?;
        Ok(id)
    }

    // == Increment Hit Count ==
    /// Bumps the hit counter. A missing key is ignored.
    pub fn increment_hit_count(&mut self, key: &str) -> Result<()> {
        if let Some(mut entry) = self.backend.get(key)? {
            entry.hit_count += 1;
            self.backend.put(entry)?;
        } else {
            debug!(cache_key = %key, "Hit count bump for missing entry ignored");
        }
        Ok(())
    }

    // == Stats ==
    /// Scans the whole table and classifies each entry at the current time.
    pub fn stats(&self) -> Result<CacheStats> {
        let entries = self.backend.scan(None)?;
        Ok(CacheStats::collect(&entries, self.now_ms()))
    }

    /// Process-local lookup counters.
    pub fn lookup_metrics(&self) -> LookupSnapshot {
        self.metrics.snapshot()
    }

    // == Clean Expired ==
    /// Deletes up to [`CLEANUP_BATCH_SIZE`] expired entries, soonest expiry first.
    pub fn clean_expired(&mut self) -> Result<CleanupOutcome> {
        let keys = self
            .backend
            .scan_expired(self.now_ms(), CLEANUP_BATCH_SIZE)?;
        let has_more = keys.len() == CLEANUP_BATCH_SIZE;

        let mut deleted = 0;
        for key in keys {
            if self.backend.delete(&key)? {
                deleted += 1;
            }
        }

        Ok(CleanupOutcome { deleted, has_more })
    }

    // == Clear All ==
    /// Deletes every entry, or only entries of one query type.
    pub fn clear_all(&mut self, query_type: Option<QueryType>) -> Result<usize> {
        let entries = self.backend.scan(query_type)?;
        let mut deleted = 0;
        for entry in entries {
            if self.backend.delete(&entry.cache_key)? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Cache key cannot be empty".to_string(),
        ));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Cache key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
