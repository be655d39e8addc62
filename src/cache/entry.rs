//! Cache Entry Module
//!
//! Defines a single resident entry and its position in the recency list.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::transform::StoredValue;

// == Cache Entry ==
/// A resident cache entry.
///
/// `prev`/`next` are slot indices into the owning [`RecencyList`](super::RecencyList);
/// `prev` points toward the most recently used end.
#[derive(Debug, Clone)]
pub struct CacheEntry<K> {
    /// The cache key
    pub key: K,
    /// Raw or transformed value
    pub value: StoredValue,
    /// Last access timestamp (Unix milliseconds), informational only
    pub last_access: u64,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

impl<K> CacheEntry<K> {
    // == Constructor ==
    /// Creates an unlinked entry stamped with the current time.
    pub fn new(key: K, value: StoredValue) -> Self {
        Self {
            key,
            value,
            last_access: current_timestamp_ms(),
            prev: None,
            next: None,
        }
    }

    // == Touch ==
    /// Refreshes the access timestamp.
    pub fn touch(&mut self) {
        self.last_access = current_timestamp_ms();
    }

    // == Replace ==
    /// Swaps in a new value on overwrite, returning the old one.
    pub fn replace(&mut self, value: StoredValue) -> StoredValue {
        self.touch();
        std::mem::replace(&mut self.value, value)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
