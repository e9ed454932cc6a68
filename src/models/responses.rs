//! Response DTOs for the query cache API
//!
//! Defines the structure of outgoing HTTP response bodies. Field names are
//! camelCase and timestamps are rendered as RFC 3339 strings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheHit, CacheStats, CleanupOutcome, EntryId, LookupSnapshot, QueryType};

/// Renders a Unix millisecond timestamp as RFC 3339.
pub fn format_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

/// Response body for key derivation (POST /keys)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeriveKeyResponse {
    pub cache_key: String,
    /// Hash algorithm that produced the key
    pub hasher: String,
}

/// Response body for a live entry (GET /entries/:key)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub cache_key: String,
    pub payload: Value,
    pub hit_count: u64,
    pub created_at: String,
}

impl EntryResponse {
    pub fn new(cache_key: impl Into<String>, hit: CacheHit) -> Self {
        Self {
            cache_key: cache_key.into(),
            payload: hit.payload,
            hit_count: hit.hit_count,
            created_at: format_timestamp(hit.created_at),
        }
    }
}

/// Response body for the upsert operation (PUT /entries)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEntryResponse {
    pub id: EntryId,
    pub cache_key: String,
    pub query_type: QueryType,
    /// TTL applied from the time of this write
    pub ttl_seconds: u64,
}

impl SetEntryResponse {
    pub fn new(id: EntryId, cache_key: impl Into<String>, query_type: QueryType) -> Self {
        Self {
            id,
            cache_key: cache_key.into(),
            query_type,
            ttl_seconds: query_type.ttl().as_secs(),
        }
    }
}

/// Response body for POST /entries/:key/hits
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HitResponse {
    pub message: String,
    pub cache_key: String,
}

impl HitResponse {
    pub fn new(cache_key: impl Into<String>) -> Self {
        let cache_key = cache_key.into();
        Self {
            message: format!("Hit recorded for '{}'", cache_key),
            cache_key,
        }
    }
}

/// Response body for DELETE /entries
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub deleted: usize,
}

/// Response body for POST /cleanup
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub deleted: usize,
    pub has_more: bool,
}

impl From<CleanupOutcome> for CleanupResponse {
    fn from(outcome: CleanupOutcome) -> Self {
        Self {
            deleted: outcome.deleted,
            has_more: outcome.has_more,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub table: CacheStats,
    /// Lookups served by this process since start
    pub lookups: LookupSnapshot,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
