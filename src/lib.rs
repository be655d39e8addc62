//! LRU Vault - a bounded LRU cache with a compress/encrypt value pipeline
//!
//! Values pass through optional encryption and compression stages on the way
//! in and are restored on the way out. Mutations can be mirrored to a
//! key-value persistence store and read back on a miss.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod persistence;
pub mod transform;

pub use api::AppState;
pub use cache::{LruVault, StatsSnapshot, VaultBuilder};
pub use config::{PersistenceMode, ServerConfig, VaultConfig};
pub use error::{CacheError, Result};
pub use persistence::{FileStore, MemoryStore, PersistenceAdapter, PersistenceConfig};
pub use transform::ValueKind;
