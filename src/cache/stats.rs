//! Cache Statistics Module
//!
//! Table-wide statistics computed from a full scan, and process-local lookup
//! counters kept by the store.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::cache::{CacheEntry, QueryType};

// == Type Stats ==
/// Entry count and accumulated hits for one query type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeStats {
    pub count: u64,
    pub hits: u64,
}

/// Per-type breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ByType {
    pub geocode: TypeStats,
    pub zoning: TypeStats,
    pub rag: TypeStats,
}

impl ByType {
    pub fn get(&self, query_type: QueryType) -> &TypeStats {
        match query_type {
            QueryType::Geocode => &self.geocode,
            QueryType::Zoning => &self.zoning,
            QueryType::Rag => &self.rag,
        }
    }

    fn get_mut(&mut self, query_type: QueryType) -> &mut TypeStats {
        match query_type {
            QueryType::Geocode => &mut self.geocode,
            QueryType::Zoning => &mut self.zoning,
            QueryType::Rag => &mut self.rag,
        }
    }
}

// == Cache Stats ==
/// Snapshot of the whole table at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub total: u64,
    pub active: u64,
    pub expired: u64,
    pub by_type: ByType,
    pub total_hits: u64,
}

impl CacheStats {
    /// Classifies every entry as active or expired at `now_ms`.
    pub fn collect<'a>(entries: impl IntoIterator<Item = &'a CacheEntry>, now_ms: u64) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            stats.total += 1;
            if entry.is_expired(now_ms) {
                stats.expired += 1;
            } else {
                stats.active += 1;
            }
            let per_type = stats.by_type.get_mut(entry.query_type);
            per_type.count += 1;
            per_type.hits += entry.hit_count;
            stats.total_hits += entry.hit_count;
        }
        stats
    }
}

// == Lookup Metrics ==
/// Counters for `get` outcomes since process start.
///
/// Atomic so the read path can update them under a shared lock.
#[derive(Debug, Default)]
pub struct LookupMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    unreadable: AtomicU64,
}

/// Point-in-time copy of [`LookupMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupSnapshot {
    pub hits: u64,
    pub misses: u64,
    /// Misses caused by a payload that failed to deserialize
    pub unreadable: u64,
    pub hit_rate: f64,
}

impl LookupMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts as a miss as well.
    pub fn record_unreadable(&self) {
        self.unreadable.fetch_add(1, Ordering::Relaxed);
        self.record_miss();
    }

    pub fn snapshot(&self) -> LookupSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        LookupSnapshot {
            hits,
            misses,
            unreadable: self.unreadable.load(Ordering::Relaxed),
            hit_rate: hit_rate(hits, misses),
        }
    }
}

// == Hit Rate ==
/// Returns hits / (hits + misses), or 0.0 if no requests have been made.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
