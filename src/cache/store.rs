//! Cache Store Module
//!
//! Main cache engine combining a HashMap index with an arena-backed recency
//! list. Every operation is O(1).

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, RecencyList, StatsSnapshot};
use crate::error::{CacheError, Result};
use crate::transform::StoredValue;

// == Cache Store ==
/// Bounded LRU storage for already-transformed values.
///
/// The index maps each key to its slot in the recency list, so
/// `len() == index.len() == recency.len()` holds after every call.
#[derive(Debug)]
pub struct CacheStore<K> {
    /// Key → slot in `recency`
    index: HashMap<K, usize>,
    /// Entries ordered by access
    recency: RecencyList<K>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of resident entries
    capacity: usize,
}

impl<K> CacheStore<K>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a store holding at most `capacity` entries.
    ///
    /// A zero capacity is rejected.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::Config(
                "capacity must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            index: HashMap::with_capacity(capacity),
            recency: RecencyList::with_capacity(capacity),
            stats: CacheStats::new(),
            capacity,
        })
    }

    // == Has ==
    /// Membership check. Counts as a hit or a miss but does not promote.
    pub fn has<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let found = self.index.contains_key(key);
        if found {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        found
    }

    // == Get ==
    /// Looks up a key, promoting it to most recently used on a hit.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&StoredValue>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&idx) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        self.stats.record_hit();
        self.recency.touch(idx);
        let entry = self.recency.get_mut(idx)?;
        entry.touch();
        Some(&entry.value)
    }

    // == Peek ==
    /// Lookup with no effect on recency or statistics.
    pub fn peek<Q>(&self, key: &Q) -> Option<&StoredValue>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        self.recency.get(idx).map(|entry| &entry.value)
    }

    // == Set ==
    /// Inserts or overwrites a key, making it the most recently used.
    ///
    /// When a new key pushes the store past capacity, the least recently used
    /// entry is removed and returned. Overwrites never evict.
    pub fn set(&mut self, key: K, value: StoredValue) -> Option<(K, StoredValue)> {
        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.recency.get_mut(idx) {
                entry.replace(value);
            }
            self.recency.touch(idx);
            return None;
        }

        let idx = self.recency.push_front(CacheEntry::new(key.clone(), value));
        self.index.insert(key, idx);

        if self.index.len() > self.capacity {
            return self.evict_oldest();
        }
        None
    }

    // == Unset ==
    /// Removes a key, returning its stored value if it was resident.
    pub fn unset<Q>(&mut self, key: &Q) -> Option<StoredValue>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        self.recency.remove(idx).map(|entry| entry.value)
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used entry.
    pub fn evict_oldest(&mut self) -> Option<(K, StoredValue)> {
        let entry = self.recency.pop_back()?;
        self.index.remove(&entry.key);
        self.stats.record_eviction();
        debug!(
            "LRU eviction: {} entries remain (capacity {})",
            self.index.len(),
            self.capacity
        );
        Some((entry.key, entry.value))
    }

    // == Entries ==
    /// Point-in-time copy of every resident entry, most recent first.
    pub fn entries(&self) -> Vec<(K, StoredValue)> {
        self.recency
            .iter()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }

    // == Stats ==
    /// Returns counters and size; `flush` zeroes the counters in the same step.
    pub fn stats(&mut self, flush: bool) -> StatsSnapshot {
        let size = self.len();
        self.stats.snapshot(size, flush)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries reachable by walking the recency list.
    pub fn reachable(&self) -> usize {
        self.recency.iter().count()
    }
}
