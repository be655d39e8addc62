//! Compression Codec
//!
//! Canonical JSON → raw deflate → base64 text, and back.

use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};
use serde_json::Value;
use tracing::debug;

use crate::error::{CacheError, Result};

// == Canonical ==
/// Deterministic text form of a value.
///
/// `serde_json::Value` keeps object keys sorted, so equal values always
/// serialize to equal text.
pub fn canonical(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(|e| CacheError::Codec(e.to_string()))
}

// == Compress ==
/// Serializes `value` canonically, deflates it and base64-encodes the result.
pub fn compress(value: &Value) -> Result<String> {
    let text = canonical(value)?;

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(text.as_bytes())
        .map_err(|e| CacheError::Codec(format!("deflate failed: {}", e)))?;
    let compressed = encoder
        .finish()
        .map_err(|e| CacheError::Codec(format!("deflate failed: {}", e)))?;

    debug!(
        "Deflate compressed: {} → {} bytes",
        text.len(),
        compressed.len()
    );

    Ok(STANDARD.encode(compressed))
}

// == Decompress ==
/// Inverse of [`compress`]: returns the canonical text, not the parsed value.
pub fn decompress(encoded: &str) -> Result<String> {
    let compressed = STANDARD
        .decode(encoded)
        .map_err(|e| CacheError::Codec(format!("invalid base64 payload: {}", e)))?;

    let mut decoder = DeflateDecoder::new(compressed.as_slice());
    let mut text = String::new();
    decoder
        .read_to_string(&mut text)
        .map_err(|e| CacheError::Codec(format!("inflate failed: {}", e)))?;

    Ok(text)
}
