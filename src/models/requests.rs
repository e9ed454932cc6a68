//! Request DTOs for the query cache API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.
//! Query types arrive as plain strings and are parsed by the handlers so an
//! unknown type is reported as a 400 with a JSON error body.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::QueryType;
use crate::error::Result;

/// Request body for key derivation (POST /keys)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeriveKeyRequest {
    pub query_type: String,
    /// Request parameters; any JSON value
    #[serde(default)]
    pub params: Value,
}

impl DeriveKeyRequest {
    pub fn query_type(&self) -> Result<QueryType> {
        self.query_type.parse()
    }
}

/// Request body for the upsert operation (PUT /entries)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEntryRequest {
    pub cache_key: String,
    pub query_type: String,
    /// Result to cache, stored as serialized JSON
    pub payload: Value,
}

impl SetEntryRequest {
    /// Parses the query type. The key itself is checked by the store.
    pub fn query_type(&self) -> Result<QueryType> {
        self.query_type.parse()
    }
}

/// Query string for DELETE /entries
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearQuery {
    #[serde(default)]
    pub query_type: Option<String>,
}

impl ClearQuery {
    pub fn query_type(&self) -> Result<Option<QueryType>> {
        self.query_type.as_deref().map(str::parse::<QueryType>).transpose()
    }
}
