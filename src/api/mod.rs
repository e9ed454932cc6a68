//! API Module
//!
//! HTTP handlers and routing for the query cache REST API.
//!
//! # Endpoints
//! - `POST /keys` - Derive a cache key from a query type and parameters
//! - `GET|PUT|DELETE /entries` - Read, upsert and clear entries
//! - `POST /entries/:key/hits` - Record a cache hit
//! - `POST /cleanup` - Sweep one batch of expired entries
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
