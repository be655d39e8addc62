//! Persistence Module
//!
//! Durable key-value stores that mirror cache writes.
//!
//! # Stores
//! - `MemoryStore`: process-local map, useful for tests and embedding
//! - `FileStore`: one file per record under a directory, survives restarts
//!
//! Records are keyed by the hex fingerprint of the cache key and hold the
//! pipeline's stored text, so any store can be read back by the same cache
//! configuration that wrote it.

mod file;
mod memory;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use file::FileStore;
pub use memory::MemoryStore;

// == Persistence Adapter ==
/// Backing store consulted on in-memory misses and updated on mutation.
///
/// Implementations own their timeout and retry behavior; the cache performs
/// no retries of its own.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Stores `stored_text` under `hash_key`, replacing any previous record.
    async fn write(&self, hash_key: &str, stored_text: &str) -> Result<()>;

    /// Returns the record under `hash_key`, if any.
    async fn read(&self, hash_key: &str) -> Result<Option<String>>;

    /// Removes the record under `hash_key`. Absent records are not an error.
    async fn delete(&self, hash_key: &str) -> Result<()>;
}

// == Persistence Config ==
/// Where write-through records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceConfig {
    /// In-process map; lost when the process exits
    Memory,
    /// Directory of record files
    Directory(PathBuf),
}

impl PersistenceConfig {
    // == Connect ==
    /// Builds the adapter described by this config.
    pub fn connect(&self) -> Arc<dyn PersistenceAdapter> {
        match self {
            PersistenceConfig::Memory => Arc::new(MemoryStore::new()),
            PersistenceConfig::Directory(root) => Arc::new(FileStore::new(root.clone())),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory() {
        let adapter = PersistenceConfig::Memory.connect();

        adapter.write("abc", "payload").await.unwrap();
        assert_eq!(adapter.read("abc").await.unwrap(), Some("payload".to_string()));
    }

    #[tokio::test]
    async fn test_connect_directory() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = PersistenceConfig::Directory(dir.path().to_path_buf()).connect();

        adapter.write("abc", "payload").await.unwrap();
        assert_eq!(adapter.read("abc").await.unwrap(), Some("payload".to_string()));

        let reopened = PersistenceConfig::Directory(dir.path().to_path_buf()).connect();
        assert_eq!(reopened.read("abc").await.unwrap(), Some("payload".to_string()));
    }
}
