//! Query Cache - TTL cache for geocoding, zoning and RAG lookups
//!
//! Derives stable keys from request parameters, stores results with a TTL
//! fixed per query type, counts hits and sweeps expired rows in batches.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::{spawn_cleanup_task, sweep_expired};
