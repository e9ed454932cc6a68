//! Configuration Module
//!
//! Handles loading server configuration from environment variables. TTLs and
//! the sweep batch size are fixed and not configurable here.

use std::env;

use tracing::warn;

use crate::cache::KeyHasher;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Seconds between expiry sweeps
    pub cleanup_interval: u64,
    /// Hash used to derive cache keys
    pub key_hasher: KeyHasher,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 3600)
    /// - `CACHE_KEY_HASH` - `fnv1a64` or `djb2` (default: fnv1a64)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            key_hasher: env::var("CACHE_KEY_HASH")
                .ok()
                .and_then(|v| match v.parse::<KeyHasher>() {
                    Ok(hasher) => Some(hasher),
                    Err(err) => {
                        warn!("Ignoring CACHE_KEY_HASH: {}", err);
                        None
                    }
                })
                .unwrap_or(defaults.key_hasher),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 3600,
            key_hasher: KeyHasher::Fnv1a64,
        }
    }
}
