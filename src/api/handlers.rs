//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::debug;

use crate::cache::LruVault;
use crate::config::ServerConfig;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, EntriesResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
    StatsQuery, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The vault is itself a cloneable handle around a shared store, so no extra
/// locking is needed here.
#[derive(Clone)]
pub struct AppState {
    pub vault: LruVault<String>,
}

impl AppState {
    pub fn new(vault: LruVault<String>) -> Self {
        Self { vault }
    }

    /// Builds the vault described by the server configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let vault = LruVault::new(config.vault_config()?)?;
        Ok(Self::new(vault))
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.vault.set(req.key.clone(), req.value).await?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Misses fall through to the persistence store when write-through is on.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.vault.get(key.as_str()).await? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => {
            debug!("GET miss for {}", key);
            Err(CacheError::NotFound(key))
        }
    }
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let removed = state.vault.unset(key.as_str()).await?;

    Ok(Json(DeleteResponse::new(key, removed)))
}

/// Handler for GET /entries
pub async fn entries_handler(State(state): State<AppState>) -> Result<Json<EntriesResponse>> {
    let entries = state.vault.all_entries().await?;

    Ok(Json(EntriesResponse::new(entries)))
}

/// Handler for GET /stats
///
/// `?flush=true` resets the hit/miss counters after reading them.
pub async fn stats_handler(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Json<StatsResponse> {
    let snapshot = state.vault.stats(query.flush).await;

    Json(StatsResponse::new(snapshot, query.flush))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
