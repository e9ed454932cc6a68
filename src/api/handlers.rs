//! API Handlers
//!
//! HTTP request handlers for each query cache endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::cache::{CacheStore, KeyHasher, QueryCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearQuery, ClearResponse, CleanupResponse, DeriveKeyRequest, DeriveKeyResponse,
    EntryResponse, HealthResponse, HitResponse, SetEntryRequest, SetEntryResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<RwLock<CacheStore>>,
    /// Hash used for key derivation
    pub hasher: KeyHasher,
}

impl AppState {
    /// Creates a new AppState with the given cache store and the default hasher.
    pub fn new(cache: CacheStore) -> Self {
        Self::with_hasher(cache, KeyHasher::default())
    }

    pub fn with_hasher(cache: CacheStore, hasher: KeyHasher) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            hasher,
        }
    }

    /// Creates a new AppState from configuration with an in-memory store.
    pub fn from_config(config: &Config) -> Self {
        Self::with_hasher(CacheStore::new(), config.key_hasher)
    }

    /// Read-through handle sharing this state's store.
    pub fn query_cache(&self) -> QueryCache {
        QueryCache::new(self.cache.clone(), self.hasher)
    }
}

/// Handler for POST /keys
pub async fn derive_key_handler(
    State(state): State<AppState>,
    Json(req): Json<DeriveKeyRequest>,
) -> Result<Json<DeriveKeyResponse>> {
    let query_type = req.query_type()?;
    let cache_key = state.hasher.derive(query_type, &req.params);

    Ok(Json(DeriveKeyResponse {
        cache_key,
        hasher: state.hasher.to_string(),
    }))
}

/// Handler for GET /entries/:key
///
/// Absent, expired and unreadable entries are all 404.
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EntryResponse>> {
    // Read lock only; lookups never write
    let cache = state.cache.read().await;
    let hit = cache
        .get(&key)?
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(EntryResponse::new(key, hit)))
}

/// Handler for PUT /entries
pub async fn set_entry_handler(
    State(state): State<AppState>,
    Json(req): Json<SetEntryRequest>,
) -> Result<Json<SetEntryResponse>> {
    let query_type = req.query_type()?;

    let mut cache = state.cache.write().await;
    let id = cache.set(&req.cache_key, query_type, &req.payload)?;

    Ok(Json(SetEntryResponse::new(id, req.cache_key, query_type)))
}

/// Handler for POST /entries/:key/hits
///
/// Succeeds whether or not the entry exists.
pub async fn hit_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<HitResponse>> {
    let mut cache = state.cache.write().await;
    cache.increment_hit_count(&key)?;

    Ok(Json(HitResponse::new(key)))
}

/// Handler for DELETE /entries?queryType=
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(query): Query<ClearQuery>,
) -> Result<Json<ClearResponse>> {
    let query_type = query.query_type()?;

    let mut cache = state.cache.write().await;
    let deleted = cache.clear_all(query_type)?;
    match query_type {
        Some(qt) => info!("Cleared {} {} cache entries", deleted, qt),
        None => info!("Cleared all {} cache entries", deleted),
    }

    Ok(Json(ClearResponse { deleted }))
}

/// Handler for POST /cleanup
///
/// Runs a single batch; callers re-invoke while `hasMore` is true.
pub async fn cleanup_handler(State(state): State<AppState>) -> Result<Json<CleanupResponse>> {
    let mut cache = state.cache.write().await;
    let outcome = cache.clean_expired()?;

    Ok(Json(outcome.into()))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let cache = state.cache.read().await;

    Ok(Json(StatsResponse {
        table: cache.stats()?,
        lookups: cache.lookup_metrics(),
    }))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
