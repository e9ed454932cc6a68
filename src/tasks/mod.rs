//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: deletes expired cache entries in batches at configured intervals

mod cleanup;

pub use cleanup::{spawn_cleanup_task, sweep_expired};
