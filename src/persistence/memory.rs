//! In-memory persistence store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::PersistenceAdapter;
use crate::error::Result;

// == Memory Store ==
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryStore {
    async fn write(&self, hash_key: &str, stored_text: &str) -> Result<()> {
        self.records
            .write()
            .await
            .insert(hash_key.to_string(), stored_text.to_string());
        Ok(())
    }

    async fn read(&self, hash_key: &str) -> Result<Option<String>> {
        Ok(self.records.read().await.get(hash_key).cloned())
    }

    async fn delete(&self, hash_key: &str) -> Result<()> {
        self.records.write().await.remove(hash_key);
        Ok(())
    }
}
