//! Cache Module
//!
//! Query cache for expensive geocoding, zoning and RAG lookups: key
//! derivation, per-type TTLs, hit accounting and batched expiry.

mod backend;
mod clock;
mod entry;
mod key;
mod read_through;
mod stats;
mod store;


// Re-export public types
pub use backend::{InMemoryBackend, StorageBackend};
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, EntryId, QueryType};
pub use key::{
    canonical_json, derive_cache_key, GeocodeParams, KeyHasher, RagParams, ZoningParams,
};
pub use read_through::QueryCache;
pub use stats::{hit_rate, ByType, CacheStats, LookupMetrics, LookupSnapshot, TypeStats};
pub use store::{CacheHit, CacheStore, CleanupOutcome};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Rows deleted per `clean_expired` call
pub const CLEANUP_BATCH_SIZE: usize = 100;
