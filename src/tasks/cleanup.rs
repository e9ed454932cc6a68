//! Expiry Sweep Task
//!
//! Background task that periodically reclaims expired cache entries in
//! bounded batches.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::cache::CacheStore;
use crate::error::Result;

/// Runs `clean_expired` until a batch comes back short.
///
/// The write lock is released between batches so readers are never blocked
/// for more than one batch. Returns the total number of entries deleted.
pub async fn sweep_expired(cache: &Arc<RwLock<CacheStore>>) -> Result<usize> {
    let mut total = 0;
    loop {
        let outcome = {
            let mut cache_guard = cache.write().await;
            cache_guard.clean_expired()?
        };
        total += outcome.deleted;

        if !outcome.has_more {
            return Ok(total);
        }
        tokio::task::yield_now().await;
    }
}

/// Spawns a background task that sweeps expired entries every interval.
///
/// Store failures are logged and the next tick tries again.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    cache: Arc<RwLock<CacheStore>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            match sweep_expired(&cache).await {
                Ok(0) => debug!("Expiry sweep: no expired entries found"),
                Ok(removed) => info!("Expiry sweep: removed {} expired entries", removed),
                Err(err) => error!("Expiry sweep failed: {}", err),
            }
        }
    })
}
