//! Value Transform Module
//!
//! Turns raw values into their stored form and back.
//!
//! # Stages
//! - Encryption (optional): AES-256-CBC over the value's text form
//! - Compression (optional): deflate + base64 over the canonical JSON text
//!
//! Encryption always runs before compression, so with both enabled the
//! deflate stage sees ciphertext and gains little.

pub mod compression;
pub mod encryption;
pub mod hash;

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{CacheError, Result};

pub use encryption::EncryptionMaterial;
pub use hash::key_hash;

// == Value Kind ==
/// Coarse classification of a cached value, recorded so decrypted text can be
/// parsed back into the right shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    /// Objects, arrays, booleans and null
    Structured,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => ValueKind::String,
            Value::Number(_) => ValueKind::Number,
            _ => ValueKind::Structured,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Structured => "structured",
        };
        f.write_str(name)
    }
}

// == Stored Value ==
/// What the cache engine actually holds for an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// Raw value, kept when no transform stage is enabled
    Plain(Value),
    /// Ciphertext hex and/or base64 deflate text
    Encoded(String),
}

impl StoredValue {
    /// Text written to the persistence store.
    pub fn to_text(&self) -> Result<String> {
        match self {
            StoredValue::Plain(value) => compression::canonical(value),
            StoredValue::Encoded(text) => Ok(text.clone()),
        }
    }
}

// == Pipeline ==
/// Encode/decode pipeline configured once per cache instance.
#[derive(Debug)]
pub struct Pipeline {
    compress: bool,
    material: Option<EncryptionMaterial>,
    kind: OnceLock<ValueKind>,
}

impl Pipeline {
    /// Creates a pipeline. `pinned_kind` fixes the classification up-front;
    /// otherwise it is captured from the first encrypted value.
    pub fn new(
        compress: bool,
        material: Option<EncryptionMaterial>,
        pinned_kind: Option<ValueKind>,
    ) -> Self {
        let kind = OnceLock::new();
        if let Some(pinned) = pinned_kind {
            let _ = kind.set(pinned);
        }

        Self {
            compress,
            material,
            kind,
        }
    }

    pub fn encrypts(&self) -> bool {
        self.material.is_some()
    }

    /// True when stored values are text rather than raw JSON.
    pub fn is_transforming(&self) -> bool {
        self.compress || self.encrypts()
    }

    /// The recorded classification, if any value has been encrypted yet.
    pub fn value_kind(&self) -> Option<ValueKind> {
        self.kind.get().copied()
    }

    // == Encode ==
    /// `compress?(encrypt?(raw))`
    pub fn encode(&self, raw: &Value) -> Result<StoredValue> {
        let ciphertext = match &self.material {
            Some(material) => Some(material.encrypt(&self.plaintext_of(raw)?)),
            None => None,
        };

        let stored = match (ciphertext, self.compress) {
            (Some(ciphertext), true) => {
                StoredValue::Encoded(compression::compress(&Value::String(ciphertext))?)
            }
            (Some(ciphertext), false) => StoredValue::Encoded(ciphertext),
            (None, true) => StoredValue::Encoded(compression::compress(raw)?),
            (None, false) => StoredValue::Plain(raw.clone()),
        };

        Ok(stored)
    }

    // == Decode ==
    /// Inverse of [`encode`](Self::encode): decompress, decrypt, then parse.
    pub fn decode(&self, stored: &StoredValue) -> Result<Value> {
        let text = match stored {
            StoredValue::Plain(value) => return Ok(value.clone()),
            StoredValue::Encoded(text) => text,
        };

        let inflated = if self.compress {
            let canonical = compression::decompress(text)?;
            Some(parse_json(&canonical)?)
        } else {
            None
        };

        match (&self.material, inflated) {
            (Some(material), Some(Value::String(ciphertext))) => {
                self.parse_plaintext(material.decrypt(&ciphertext)?)
            }
            (Some(_), Some(other)) => Err(CacheError::Codec(format!(
                "expected ciphertext inside compressed payload, found {}",
                ValueKind::of(&other)
            ))),
            (Some(material), None) => self.parse_plaintext(material.decrypt(text)?),
            (None, Some(value)) => Ok(value),
            (None, None) => Err(CacheError::Codec(
                "encoded value found but no transform is enabled".to_string(),
            )),
        }
    }

    /// Rebuilds a stored value from its persisted text.
    pub fn stored_from_text(&self, text: String) -> Result<StoredValue> {
        if self.is_transforming() {
            Ok(StoredValue::Encoded(text))
        } else {
            parse_json(&text).map(StoredValue::Plain)
        }
    }

    /// Records the classification on first use and serializes per kind.
    fn plaintext_of(&self, raw: &Value) -> Result<String> {
        let found = ValueKind::of(raw);
        let expected = *self.kind.get_or_init(|| found);
        if expected != found {
            return Err(CacheError::ValueKindMismatch { expected, found });
        }

        match raw {
            Value::String(s) => Ok(s.clone()),
            other => compression::canonical(other),
        }
    }

    fn parse_plaintext(&self, plaintext: String) -> Result<Value> {
        match self.kind.get() {
            Some(ValueKind::String) => Ok(Value::String(plaintext)),
            Some(ValueKind::Number) | Some(ValueKind::Structured) => parse_json(&plaintext),
            None => {
                // Cold start on persisted data: nothing encrypted yet.
                debug!("Decoding with no recorded value kind; guessing from content");
                Ok(serde_json::from_str(&plaintext).unwrap_or(Value::String(plaintext)))
            }
        }
    }
}

fn parse_json(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| CacheError::Codec(format!("invalid JSON: {}", e)))
}
