//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

/// Longest key accepted over HTTP, in bytes.
pub const MAX_KEY_LEN: usize = 256;

/// Request body for the SET operation (PUT /set)
///
/// `value` may be any JSON document; it goes through the value pipeline
/// unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LEN {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LEN
            ));
        }
        None
    }
}

/// Query string for GET /stats
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    /// Reset hit/miss counters after reading them
    #[serde(default)]
    pub flush: bool,
}
