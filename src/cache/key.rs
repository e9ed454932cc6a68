//! Cache Key Module
//!
//! Derives short deterministic keys from a query type and its parameters.
//!
//! Parameters are rendered as canonical JSON (object keys sorted at every
//! depth, array order kept) and prefixed with the query type before hashing.
//! The resulting key is `<queryType>:<base36 hash>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::QueryType;
use crate::error::{CacheError, Result};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const DJB2_SEED: i32 = 5381;

// == Key Hasher ==
/// Hash used to compress the canonical request string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyHasher {
    /// 64-bit FNV-1a over UTF-8 bytes
    #[default]
    Fnv1a64,
    /// 32-bit multiply-by-33 hash over UTF-16 code units.
    ///
    /// Produces the same keys as rows written by the earlier deployment.
    /// Integral floats are rendered without a fraction (`43.0` as `43`) to
    /// match those keys. Numbers that the old writer printed in exponent form
    /// (magnitudes below 1e-6 or from 1e21 up) may still hash differently.
    Djb2,
}

impl KeyHasher {
    /// Hashes `input` and renders it in base 36.
    pub fn hash(self, input: &str) -> String {
        match self {
            KeyHasher::Fnv1a64 => to_base36(fnv1a64(input)),
            KeyHasher::Djb2 => to_base36(u64::from(djb2(input).unsigned_abs())),
        }
    }

    /// Derives the cache key for a request.
    ///
    /// Never fails: every JSON value has a canonical form.
    pub fn derive(self, query_type: QueryType, params: &Value) -> String {
        let mut canonical = String::new();
        write_canonical(params, self == KeyHasher::Djb2, &mut canonical);
        let digest = self.hash(&format!("{}:{}", query_type, canonical));
        format!("{}:{}", query_type, digest)
    }

    /// Derives the cache key from any serializable parameter struct.
    pub fn derive_for<P: Serialize + ?Sized>(
        self,
        query_type: QueryType,
        params: &P,
    ) -> Result<String> {
        let value = serde_json::to_value(params)?;
        Ok(self.derive(query_type, &value))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KeyHasher::Fnv1a64 => "fnv1a64",
            KeyHasher::Djb2 => "djb2",
        }
    }
}

impl fmt::Display for KeyHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyHasher {
    type Err = CacheError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fnv1a64" | "fnv" => Ok(KeyHasher::Fnv1a64),
            "djb2" | "legacy" => Ok(KeyHasher::Djb2),
            other => Err(CacheError::InvalidRequest(format!(
                "Unknown key hash: {}",
                other
            ))),
        }
    }
}

/// Derives a key with the default hasher.
pub fn derive_cache_key(query_type: QueryType, params: &Value) -> String {
    KeyHasher::default().derive(query_type, params)
}

// == Canonical JSON ==
/// Serializes `value` with object keys sorted lexicographically.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, false, &mut out);
    out
}

/// `integral_floats_bare` prints whole-number floats without `.0`.
fn write_canonical(value: &Value, integral_floats_bare: bool, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], integral_floats_bare, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, integral_floats_bare, out);
            }
            out.push(']');
        }
        Value::Number(n) if integral_floats_bare => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
                // -0.0 prints as "-0" otherwise
                out.push_str(&format!("{:.0}", f + 0.0));
            }
            _ => out.push_str(&n.to_string()),
        },
        scalar => out.push_str(&scalar.to_string()),
    }
}

// == Hash Functions ==
fn fnv1a64(input: &str) -> u64 {
    input.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

fn djb2(input: &str) -> i32 {
    input.encode_utf16().fold(DJB2_SEED, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(i32::from(unit))
    })
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(13);
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

// == Typed Parameters ==
/// Parameters of a geocoding lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeParams {
    pub address: String,
    pub city: String,
    pub state: String,
}

/// Parameters of a zoning lookup at a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoningParams {
    pub longitude: f64,
    pub latitude: f64,
}

/// Parameters of a document-grounded question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagParams {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoning_district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_footage: Option<u64>,
}
