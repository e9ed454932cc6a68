//! Cache Entry Module
//!
//! Defines cached rows, the query categories they belong to and the fixed
//! TTL attached to each category.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CacheError;

const HOUR_SECS: u64 = 60 * 60;
const DAY_SECS: u64 = 24 * HOUR_SECS;

// == Query Type ==
/// Category of the expensive operation whose result is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Address to coordinates
    Geocode,
    /// Coordinates to zoning district and overlays
    Zoning,
    /// Document-grounded question answering
    Rag,
}

impl QueryType {
    /// Every query type, in display order.
    pub const ALL: [QueryType; 3] = [QueryType::Geocode, QueryType::Zoning, QueryType::Rag];

    /// Time-to-live for results of this type.
    ///
    /// Addresses essentially never move, zoning changes over months and
    /// document answers should follow source updates.
    pub fn ttl(self) -> Duration {
        match self {
            QueryType::Geocode => Duration::from_secs(30 * DAY_SECS),
            QueryType::Zoning => Duration::from_secs(7 * DAY_SECS),
            QueryType::Rag => Duration::from_secs(24 * HOUR_SECS),
        }
    }

    /// TTL in milliseconds.
    pub fn ttl_ms(self) -> u64 {
        self.ttl().as_millis() as u64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::Geocode => "geocode",
            QueryType::Zoning => "zoning",
            QueryType::Rag => "rag",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "geocode" => Ok(QueryType::Geocode),
            "zoning" => Ok(QueryType::Zoning),
            "rag" => Ok(QueryType::Rag),
            other => Err(CacheError::InvalidRequest(format!(
                "Unknown query type: {}",
                other
            ))),
        }
    }
}

// == Entry Id ==
/// Identifier of a stored row, stable across upserts of the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// == Cache Entry ==
/// A single cached result and its bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub id: EntryId,
    /// Derived key, unique across the table
    pub cache_key: String,
    pub query_type: QueryType,
    /// Serialized result, opaque to the cache
    pub payload: String,
    /// Hits served since creation
    pub hit_count: u64,
    /// Creation timestamp (Unix milliseconds), kept across refreshes
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a fresh entry written at `now_ms`.
    pub fn new(
        cache_key: impl Into<String>,
        query_type: QueryType,
        payload: impl Into<String>,
        now_ms: u64,
    ) -> Self {
        Self {
            id: EntryId::new(),
            cache_key: cache_key.into(),
            query_type,
            payload: payload.into(),
            hit_count: 0,
            created_at: now_ms,
            expires_at: now_ms + query_type.ttl_ms(),
        }
    }

    // == Refresh ==
    /// Replaces the payload and restarts the TTL from `now_ms`.
    ///
    /// `created_at`, `hit_count` and `id` are left alone.
    pub fn refresh(&mut self, query_type: QueryType, payload: String, now_ms: u64) {
        self.query_type = query_type;
        self.payload = payload;
        self.expires_at = now_ms + query_type.ttl_ms();
    }

    // == Is Expired ==
    /// An entry is expired once `expires_at` is strictly in the past.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at < now_ms
    }
}
