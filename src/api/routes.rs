//! API Routes
//!
//! Configures the Axum router with all query cache endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, clear_handler, derive_key_handler, get_entry_handler, health_handler,
    hit_handler, set_entry_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /keys` - Derive a cache key
/// - `PUT /entries` - Upsert an entry
/// - `DELETE /entries` - Clear entries, optionally `?queryType=`
/// - `GET /entries/:key` - Read a live entry
/// - `POST /entries/:key/hits` - Record a hit
/// - `POST /cleanup` - Delete one batch of expired entries
/// - `GET /stats` - Table and lookup statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/keys", post(derive_key_handler))
        .route("/entries", put(set_entry_handler).delete(clear_handler))
        .route("/entries/:key", get(get_entry_handler))
        .route("/entries/:key/hits", post(hit_handler))
        .route("/cleanup", post(cleanup_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
