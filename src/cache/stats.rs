//! Cache Statistics Module
//!
//! Point-in-time entry classification plus cumulative miss and eviction
//! counters.

use serde::Serialize;

// == Cache Counters ==
/// Running counters kept by the store between scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheCounters {
    /// Reads that found nothing or found an expired entry
    pub misses: u64,
    /// Entries removed by the capacity pass of a sweep
    pub evictions: u64,
}

impl CacheCounters {
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }
}

// == Cache Stats ==
/// Snapshot of the cache returned by `stats()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Entries currently held, valid or not
    pub size: usize,
    /// Entries that would be served by a read
    pub valid_items: usize,
    /// Entries past their TTL and not yet swept
    pub expired_items: usize,
    /// Sum of hit counts over valid entries
    pub total_hits: u64,
    /// `total_hits / valid_items`, 0 when there are no valid items
    pub hit_rate: f64,
    /// Cumulative misses since construction
    pub misses: u64,
    /// Cumulative capacity evictions since construction
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Builds the snapshot from a scan result and the running counters.
    pub fn from_scan(
        valid_items: usize,
        expired_items: usize,
        total_hits: u64,
        counters: CacheCounters,
    ) -> Self {
        Self {
            size: valid_items + expired_items,
            valid_items,
            expired_items,
            total_hits,
            hit_rate: hit_rate(total_hits, valid_items),
            misses: counters.misses,
            evictions: counters.evictions,
        }
    }
}

// == Hit Rate ==
/// Average hits per valid entry, guarding the empty case.
pub fn hit_rate(total_hits: u64, valid_items: usize) -> f64 {
    if valid_items == 0 {
        0.0
    } else {
        total_hits as f64 / valid_items as f64
    }
}
