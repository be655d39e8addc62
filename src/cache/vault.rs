//! Vault Module
//!
//! Public cache handle: transforms values through the pipeline, keeps them in
//! the LRU store and mirrors mutations to the persistence store.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, StatsSnapshot};
use crate::config::{PersistenceMode, VaultConfig};
use crate::error::Result;
use crate::persistence::PersistenceAdapter;
use crate::transform::{key_hash, Pipeline, StoredValue, ValueKind};

/// Called with the key and decoded value of every entry leaving the cache.
pub type EvictionCallback<K> = Arc<dyn Fn(&K, &Value) + Send + Sync>;

// == Lru Vault ==
/// Cloneable handle to a shared cache instance.
///
/// The store sits behind a single mutex that is never held across a
/// persistence call. Eviction callbacks run after the lock is released, so a
/// callback may safely call back into the same vault.
///
/// In [`PersistenceMode::Background`] store calls are queued while the lock is
/// held and applied in that order by one worker task per vault.
pub struct LruVault<K> {
    inner: Arc<VaultInner<K>>,
}

struct VaultInner<K> {
    store: Mutex<CacheStore<K>>,
    capacity: usize,
    pipeline: Pipeline,
    adapter: Option<Arc<dyn PersistenceAdapter>>,
    mode: PersistenceMode,
    on_evicted: Option<EvictionCallback<K>>,
    /// Started on the first background operation
    background: OnceLock<mpsc::UnboundedSender<PersistOp>>,
}

impl<K> Clone for LruVault<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

// == Builder ==
/// Collects the parts of an [`LruVault`] that don't fit in [`VaultConfig`].
pub struct VaultBuilder<K> {
    config: VaultConfig,
    adapter: Option<Arc<dyn PersistenceAdapter>>,
    on_evicted: Option<EvictionCallback<K>>,
}

impl<K> VaultBuilder<K>
where
    K: Eq + Hash + Clone + Serialize + Send + Sync + 'static,
{
    /// Registers the eviction callback.
    pub fn on_evicted<F>(mut self, callback: F) -> Self
    where
        F: Fn(&K, &Value) + Send + Sync + 'static,
    {
        self.on_evicted = Some(Arc::new(callback));
        self
    }

    /// Uses a caller-supplied store and turns write-through on.
    pub fn adapter(mut self, adapter: Arc<dyn PersistenceAdapter>) -> Self {
        self.config.write_through = true;
        self.adapter = Some(adapter);
        self
    }

    pub fn build(self) -> Result<LruVault<K>> {
        let VaultBuilder {
            config,
            adapter,
            on_evicted,
        } = self;

        if adapter.is_none() {
            config.validate()?;
        }
        let store = CacheStore::new(config.capacity)?;

        let adapter = match adapter {
            Some(adapter) => Some(adapter),
            None if config.write_through => config.persistence.as_ref().map(|p| p.connect()),
            None => None,
        };

        let pipeline = Pipeline::new(config.compress, config.material(), config.value_kind);

        info!(
            "Cache initialized: capacity={}, compress={}, encrypt={}, write_through={}",
            config.capacity,
            config.compress,
            config.encrypt,
            adapter.is_some()
        );

        Ok(LruVault {
            inner: Arc::new(VaultInner {
                store: Mutex::new(store),
                capacity: config.capacity,
                pipeline,
                adapter,
                mode: config.persistence_mode,
                on_evicted,
                background: OnceLock::new(),
            }),
        })
    }
}

impl<K> LruVault<K>
where
    K: Eq + Hash + Clone + Serialize + Send + Sync + 'static,
{
    // == Constructors ==
    /// Builds a vault from `config` with no eviction callback.
    pub fn new(config: VaultConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: VaultConfig) -> VaultBuilder<K> {
        VaultBuilder {
            config,
            adapter: None,
            on_evicted: None,
        }
    }

    // == Has ==
    /// In-memory membership check; counts a hit or miss.
    pub async fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.store.lock().await.has(key)
    }

    // == Get ==
    /// Returns the value for `key`, falling back to persistence on a miss.
    ///
    /// A persisted record found on a miss is re-inserted as the most recently
    /// used entry, which may evict another entry.
    pub async fn get<Q>(&self, key: &Q) -> Result<Option<Value>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Serialize + ToOwned<Owned = K> + ?Sized,
    {
        let cached = self.inner.store.lock().await.get(key).cloned();
        if let Some(stored) = cached {
            return self.inner.pipeline.decode(&stored).map(Some);
        }

        let Some(adapter) = &self.inner.adapter else {
            return Ok(None);
        };

        let hash = key_hash(key)?;
        let Some(text) = adapter.read(&hash).await? else {
            debug!("Persistence miss for {}", hash);
            return Ok(None);
        };

        let pipeline = &self.inner.pipeline;
        if pipeline.encrypts() && pipeline.value_kind().is_none() {
            warn!(
                "Rehydrating record {} with no recorded value kind; set value_kind to avoid guessing its shape",
                hash
            );
        }
        let stored = pipeline.stored_from_text(text)?;
        let value = pipeline.decode(&stored)?;

        let mut store = self.inner.store.lock().await;
        // a set that landed during the read is newer than the persisted record
        if let Some(resident) = store.peek(key).cloned() {
            drop(store);
            debug!("Record {} was replaced during rehydrate, keeping resident value", hash);
            return pipeline.decode(&resident).map(Some);
        }
        let evicted = store.set(key.to_owned(), stored);
        drop(store);
        self.notify_evicted(evicted);

        debug!("Rehydrated {} from persistence", hash);
        Ok(Some(value))
    }

    // == Set ==
    /// Stores `value` under `key`, evicting the least recently used entry if
    /// the cache is full, then mirrors the write to persistence.
    ///
    /// A persistence failure is returned but the in-memory write stands.
    pub async fn set(&self, key: K, value: Value) -> Result<()> {
        let stored = self.inner.pipeline.encode(&value)?;

        let record = match &self.inner.adapter {
            Some(_) => Some((key_hash(&key)?, stored.to_text()?)),
            None => None,
        };

        let mut store = self.inner.store.lock().await;
        let evicted = store.set(key, stored);
        let pending =
            record.and_then(|(hash, text)| self.dispatch(PersistOp::Write { hash, text }));
        drop(store);

        self.notify_evicted(evicted);

        if let Some(op) = pending {
            self.write_through(op).await?;
        }
        Ok(())
    }

    // == Unset ==
    /// Removes `key` from memory and persistence. Returns whether it was
    /// resident in memory.
    pub async fn unset<Q>(&self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Serialize + ToOwned<Owned = K> + ?Sized,
    {
        let hash = match &self.inner.adapter {
            Some(_) => Some(key_hash(key)?),
            None => None,
        };

        let mut store = self.inner.store.lock().await;
        let removed = store.unset(key);
        let pending = hash.and_then(|hash| self.dispatch(PersistOp::Delete { hash }));
        drop(store);

        let was_resident = removed.is_some();
        if let Some(stored) = removed {
            self.notify_evicted(Some((key.to_owned(), stored)));
        }

        if let Some(op) = pending {
            self.write_through(op).await?;
        }
        Ok(was_resident)
    }

    // == All Entries ==
    /// Decoded snapshot of every resident entry. Order is not part of the
    /// contract.
    pub async fn all_entries(&self) -> Result<Vec<(K, Value)>> {
        let snapshot = self.inner.store.lock().await.entries();
        snapshot
            .into_iter()
            .map(|(key, stored)| Ok((key, self.inner.pipeline.decode(&stored)?)))
            .collect()
    }

    // == Stats ==
    /// Hit/miss counters and size; `flush` resets the counters atomically.
    pub async fn stats(&self, flush: bool) -> StatsSnapshot {
        self.inner.store.lock().await.stats(flush)
    }

    pub async fn len(&self) -> usize {
        self.inner.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.store.lock().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Persistence record key for `key`.
    pub fn key_hash<Q: Serialize + ?Sized>(&self, key: &Q) -> Result<String> {
        key_hash(key)
    }

    /// Classification recorded by the encryption stage, if any.
    pub fn value_kind(&self) -> Option<ValueKind> {
        self.inner.pipeline.value_kind()
    }

    #[cfg(test)]
    pub(crate) fn store_is_locked(&self) -> bool {
        self.inner.store.try_lock().is_err()
    }

    /// Decodes a removed entry and hands it to the callback.
    fn notify_evicted(&self, evicted: Option<(K, StoredValue)>) {
        let (Some(callback), Some((key, stored))) = (&self.inner.on_evicted, evicted) else {
            return;
        };

        match self.inner.pipeline.decode(&stored) {
            Ok(value) => callback(&key, &value),
            Err(e) => warn!("Skipping eviction callback, value could not be decoded: {}", e),
        }
    }

    /// Queues `op` for the background worker, or hands it back to be awaited
    /// by the caller in write-through mode. Called with the store lock held so
    /// queue order matches the order of in-memory mutations.
    fn dispatch(&self, op: PersistOp) -> Option<PersistOp> {
        let adapter = self.inner.adapter.as_ref()?;

        match self.inner.mode {
            PersistenceMode::WriteThrough => Some(op),
            PersistenceMode::Background => {
                let queue = self
                    .inner
                    .background
                    .get_or_init(|| spawn_persist_worker(Arc::clone(adapter)));
                if queue.send(op).is_err() {
                    warn!("Background persistence worker has stopped, dropping operation");
                }
                None
            }
        }
    }

    async fn write_through(&self, op: PersistOp) -> Result<()> {
        match &self.inner.adapter {
            Some(adapter) => op.apply(adapter.as_ref()).await,
            None => Ok(()),
        }
    }
}

/// Applies queued operations one at a time until every vault handle is gone.
fn spawn_persist_worker(
    adapter: Arc<dyn PersistenceAdapter>,
) -> mpsc::UnboundedSender<PersistOp> {
    let (tx, mut rx) = mpsc::unbounded_channel::<PersistOp>();

    tokio::spawn(async move {
        while let Some(op) = rx.recv().await {
            if let Err(e) = op.apply(adapter.as_ref()).await {
                warn!("Background persistence failed: {}", e);
            }
        }
        debug!("Background persistence worker stopped");
    });

    tx
}

enum PersistOp {
    Write { hash: String, text: String },
    Delete { hash: String },
}

impl PersistOp {
    async fn apply(&self, adapter: &dyn PersistenceAdapter) -> Result<()> {
        match self {
            PersistOp::Write { hash, text } => adapter.write(hash, text).await,
            PersistOp::Delete { hash } => adapter.delete(hash).await,
        }
    }
}
