//! Request and Response models for the query cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ClearQuery, DeriveKeyRequest, SetEntryRequest};
pub use responses::{
    format_timestamp, ClearResponse, CleanupResponse, DeriveKeyResponse, EntryResponse,
    HealthResponse, HitResponse, SetEntryResponse, StatsResponse,
};
