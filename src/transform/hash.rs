//! Key Fingerprint Module
//!
//! Derives the fixed-length lookup key used by persistence adapters.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{CacheError, Result};

/// Length in characters of a hex-encoded key fingerprint.
pub const KEY_HASH_LEN: usize = 64;

// == Key Hash ==
/// Returns the hex-encoded SHA-256 of the key's canonical JSON form.
///
/// Only used to address records in the persistence store. In-memory lookups
/// compare keys by value.
pub fn key_hash<K: Serialize + ?Sized>(key: &K) -> Result<String> {
    let canonical = serde_json::to_vec(key).map_err(|e| CacheError::Codec(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}
