//! Read-Through Module
//!
//! Wraps an expensive provider call with the cache: derive the key, serve a
//! live entry if there is one, otherwise compute and write the result back.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheStore, KeyHasher, QueryType};

/// Shared handle combining a store with the key hasher in use.
#[derive(Debug, Clone)]
pub struct QueryCache {
    store: Arc<RwLock<CacheStore>>,
    hasher: KeyHasher,
}

impl QueryCache {
    pub fn new(store: Arc<RwLock<CacheStore>>, hasher: KeyHasher) -> Self {
        Self { store, hasher }
    }

    pub fn store(&self) -> &Arc<RwLock<CacheStore>> {
        &self.store
    }

    pub fn hasher(&self) -> KeyHasher {
        self.hasher
    }

    /// Returns the cached result for `params`, or runs `compute` and caches it.
    ///
    /// `compute` runs without any lock held, so two concurrent misses on the
    /// same key may both compute; the later write wins. A failed `compute`
    /// caches nothing and its error is returned as-is. A failed write-back is
    /// logged and the computed value is still returned.
    pub async fn read_through<P, T, F, Fut>(
        &self,
        query_type: QueryType,
        params: &P,
        compute: F,
    ) -> anyhow::Result<T>
    where
        P: Serialize + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let key = self.hasher.derive_for(query_type, params)?;

        let cached = self.store.read().await.get_as::<T>(&key)?;
        if let Some(value) = cached {
            debug!(cache_key = %key, "Cache hit");
            if let Err(err) = self.store.write().await.increment_hit_count(&key) {
                warn!(cache_key = %key, error = %err, "Failed to record cache hit");
            }
            return Ok(value);
        }

        debug!(cache_key = %key, "Cache miss, computing");
        let value = compute().await?;
        if let Err(err) = self.store.write().await.set(&key, query_type, &value) {
            warn!(cache_key = %key, error = %err, "Failed to cache computed result");
        }
        Ok(value)
    }
}
