//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Running counters for one cache instance.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of lookups that found nothing in memory
    pub misses: u64,
    /// Number of entries evicted due to LRU policy
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Reset ==
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // == Snapshot ==
    /// Captures the counters alongside the current size, resetting them when
    /// `flush` is set.
    pub fn snapshot(&mut self, size: usize, flush: bool) -> StatsSnapshot {
        let snapshot = StatsSnapshot {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            size,
            hit_rate: self.hit_rate(),
        };
        if flush {
            self.reset();
        }
        snapshot
    }
}

// == Stats Snapshot ==
/// Point-in-time view returned by `stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Resident entries at the time of the read
    pub size: usize,
    pub hit_rate: f64,
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        assert_eq!(stats.hit_rate(), 1.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_record_eviction() {
        let mut stats = CacheStats::new();
        stats.record_eviction();
        stats.record_eviction();
        assert_eq!(stats.evictions, 2);
    }

    #[test]
    fn test_snapshot_without_flush_keeps_counters() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();

        let snap = stats.snapshot(7, false);
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.size, 7);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_flush_zeroes_and_is_idempotent() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_eviction();

        let first = stats.snapshot(3, true);
        assert_eq!((first.hits, first.misses, first.evictions), (1, 1, 1));

        let second = stats.snapshot(3, true);
        let third = stats.snapshot(3, true);
        assert_eq!((second.hits, second.misses, second.evictions), (0, 0, 0));
        assert_eq!(second, third);
    }
}
