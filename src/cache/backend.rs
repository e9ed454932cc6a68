//! Storage Backend Module
//!
//! The persistence seam beneath the cache store. A backend keeps one row per
//! cache key and must serve lookups by key, by expiry order and by query type.

use std::collections::{BTreeSet, HashMap};

use crate::cache::{CacheEntry, QueryType};
use crate::error::Result;

// == Storage Backend ==
/// Row storage for cache entries.
///
/// Writers are serialized by the caller, so a `get` followed by a `put` on
/// the same key cannot lose an update. Implementations report connectivity
/// problems as [`CacheError::Store`](crate::error::CacheError::Store).
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Fetches the row for `key`, expired or not.
    fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Inserts or replaces the row keyed by `entry.cache_key`.
    fn put(&mut self, entry: CacheEntry) -> Result<()>;

    /// Removes the row for `key`. Returns whether a row existed.
    fn delete(&mut self, key: &str) -> Result<bool>;

    /// Up to `limit` keys with `expires_at < now_ms`, soonest expiry first.
    fn scan_expired(&self, now_ms: u64, limit: usize) -> Result<Vec<String>>;

    /// All rows, optionally restricted to one query type.
    fn scan(&self, query_type: Option<QueryType>) -> Result<Vec<CacheEntry>>;
}

// == In-Memory Backend ==
/// HashMap rows plus an ordered index on `(expires_at, cache_key)`.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    rows: HashMap<String, CacheEntry>,
    by_expiry: BTreeSet<(u64, String)>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows, including expired ones.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl StorageBackend for InMemoryBackend {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.rows.get(key).cloned())
    }

    fn put(&mut self, entry: CacheEntry) -> Result<()> {
        if let Some(old) = self.rows.get(&entry.cache_key) {
            self.by_expiry
                .remove(&(old.expires_at, old.cache_key.clone()));
        }
        self.by_expiry
            .insert((entry.expires_at, entry.cache_key.clone()));
        self.rows.insert(entry.cache_key.clone(), entry);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        match self.rows.remove(key) {
            Some(old) => {
                self.by_expiry.remove(&(old.expires_at, old.cache_key));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn scan_expired(&self, now_ms: u64, limit: usize) -> Result<Vec<String>> {
        Ok(self
            .by_expiry
            .iter()
            .take_while(|(expires_at, _)| *expires_at < now_ms)
            .take(limit)
            .map(|(_, key)| key.clone())
            .collect())
    }

    fn scan(&self, query_type: Option<QueryType>) -> Result<Vec<CacheEntry>> {
        Ok(self
            .rows
            .values()
            .filter(|entry| query_type.map_or(true, |qt| entry.query_type == qt))
            .cloned()
            .collect())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, query_type: QueryType, now_ms: u64) -> CacheEntry {
        CacheEntry::new(key, query_type, "null", now_ms)
    }

    #[test]
    fn test_put_replaces_by_key() {
        let mut backend = InMemoryBackend::new();
        backend.put(entry("k", QueryType::Rag, 0)).unwrap();
        backend.put(entry("k", QueryType::Rag, 10)).unwrap();

        assert_eq!(backend.len(), 1);
        assert_eq!(backend.by_expiry.len(), 1);
        assert_eq!(backend.get("k").unwrap().unwrap().created_at, 10);
    }

    #[test]
    fn test_scan_expired_is_ordered_and_bounded() {
        let mut backend = InMemoryBackend::new();
        let mut late = entry("late", QueryType::Rag, 0);
        late.expires_at = 30;
        let mut early = entry("early", QueryType::Rag, 0);
        early.expires_at = 10;
        let mut live = entry("live", QueryType::Rag, 0);
        live.expires_at = 100;
        backend.put(late).unwrap();
        backend.put(early).unwrap();
        backend.put(live).unwrap();

        assert_eq!(backend.scan_expired(50, 10).unwrap(), vec!["early", "late"]);
        assert_eq!(backend.scan_expired(50, 1).unwrap(), vec!["early"]);
        assert!(backend.scan_expired(10, 10).unwrap().is_empty());
    }

    #[test]
    fn test_delete_drops_index() {
        let mut backend = InMemoryBackend::new();
        backend.put(entry("k", QueryType::Geocode, 0)).unwrap();

        assert!(backend.delete("k").unwrap());
        assert!(!backend.delete("k").unwrap());
        assert!(backend.is_empty());
        assert!(backend.scan_expired(u64::MAX, 10).unwrap().is_empty());
    }

    #[test]
    fn test_scan_filters_by_type() {
        let mut backend = InMemoryBackend::new();
        backend.put(entry("g", QueryType::Geocode, 0)).unwrap();
        backend.put(entry("z", QueryType::Zoning, 0)).unwrap();

        assert_eq!(backend.scan(None).unwrap().len(), 2);
        let zoning = backend.scan(Some(QueryType::Zoning)).unwrap();
        assert_eq!(zoning.len(), 1);
        assert_eq!(zoning[0].cache_key, "z");
    }
}
