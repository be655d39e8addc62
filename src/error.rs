//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::transform::ValueKind;

// == Cache Error Enum ==
/// Unified error type for the cache and its HTTP front-end.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Invalid construction parameters
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Cipher failure (bad material, padding, malformed ciphertext)
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Malformed compressed payload or serialization failure
    #[error("Codec error: {0}")]
    Codec(String),

    /// Value classification disagrees with the one recorded for this cache
    #[error("Value kind mismatch: cache holds {expected} values, got {found}")]
    ValueKindMismatch { expected: ValueKind, found: ValueKind },

    /// Persistence adapter failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Persistence(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::ValueKindMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            CacheError::Persistence(_) => StatusCode::BAD_GATEWAY,
            CacheError::Config(_) | CacheError::Crypto(_) | CacheError::Codec(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
