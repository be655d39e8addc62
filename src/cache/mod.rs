//! Cache Module
//!
//! Bounded in-memory LRU cache with transformed values and optional
//! write-through persistence.

mod entry;
mod lru;
mod stats;
mod store;
mod vault;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::RecencyList;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::CacheStore;
pub use vault::{EvictionCallback, LruVault, VaultBuilder};
