//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking, lazy TTL
//! expiration and a periodic sweep that also enforces capacity.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::persistence::{decode_snapshot, encode_snapshot, SnapshotStorage};
use crate::cache::{CacheCounters, CacheEntry, CacheStats, KeyPattern, LruTracker};
use crate::config::CacheConfig;
use crate::error::CacheError;

// == Sweep Report ==
/// What a sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries dropped because their TTL had elapsed
    pub expired: usize,
    /// Entries dropped to get back under `max_size`
    pub evicted: usize,
    /// Whether a snapshot was written after the sweep
    pub persisted: bool,
}

// == Cache Store ==
/// Keyed TTL store with least-recently-accessed eviction.
///
/// `set` never evicts; the store may briefly hold more than `max_size`
/// entries until the next [`CacheStore::sweep`].
#[derive(Debug)]
pub struct CacheStore<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Access order tracker, holds exactly the keys of `entries`
    lru: LruTracker,
    /// Cumulative counters
    counters: CacheCounters,
    config: CacheConfig,
    /// Snapshot target, used only when persistence is enabled
    storage: Option<Arc<dyn SnapshotStorage>>,
}

impl<T: Clone> CacheStore<T> {
    // == Constructor ==
    /// Creates an in-memory store.
    ///
    /// Fails only when the configuration is unusable.
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        config.validate()?;
        Ok(Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            counters: CacheCounters::default(),
            config,
            storage: None,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Stores a value, replacing any previous entry under the same key.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Lifetime in milliseconds (uses `default_ttl` if None)
    pub fn set(&mut self, key: impl Into<String>, value: T, ttl: Option<u64>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.config.default_ttl);

        self.lru.touch(&key);
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// A hit bumps the entry's hit count and access time. An expired entry
    /// is deleted and reported absent.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let now = current_timestamp_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.counters.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.counters.record_miss();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.record_hit(now);
        let value = entry.value.clone();
        self.lru.touch(key);
        Some(value)
    }

    // == Has ==
    /// Checks presence with the same expiry rule as `get`.
    ///
    /// Does not count as an access; an expired entry is still deleted.
    pub fn has(&mut self, key: &str) -> bool {
        let now = current_timestamp_ms();
        let Some(expired) = self.entries.get(key).map(|entry| entry.is_expired_at(now)) else {
            return false;
        };

        if expired {
            self.remove_entry(key);
        }
        !expired
    }

    /// Returns the entry without any side effect, expired or not.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry<T>> {
        self.entries.get(key)
    }

    // == Delete ==
    /// Removes an entry, returning whether one was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    // == Invalidate Pattern ==
    /// Deletes every key matching the pattern and returns how many went.
    pub fn invalidate_pattern(&mut self, pattern: impl Into<KeyPattern>) -> usize {
        let pattern = pattern.into();
        let doomed: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.matches(key))
            .cloned()
            .collect();

        for key in &doomed {
            self.remove_entry(key);
        }

        debug!("Invalidated {} keys matching {:?}", doomed.len(), pattern);
        doomed.len()
    }

    // == Stats ==
    /// Classifies entries as valid or expired without removing any.
    pub fn stats(&self) -> CacheStats {
        let now = current_timestamp_ms();
        let mut valid = 0;
        let mut expired = 0;
        let mut total_hits = 0;

        for entry in self.entries.values() {
            if entry.is_expired_at(now) {
                expired += 1;
            } else {
                valid += 1;
                total_hits += entry.hit_count;
            }
        }

        CacheStats::from_scan(valid, expired, total_hits, self.counters)
    }

    // == Sweep ==
    /// Drops expired entries, then evicts the least recently accessed until
    /// the store is back at `max_size`.
    pub fn sweep(&mut self) -> SweepReport {
        let now = current_timestamp_ms();

        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        let mut evicted = 0;
        while self.entries.len() > self.config.max_size {
            let Some(key) = self.lru.evict_oldest() else {
                break;
            };
            if self.entries.remove(&key).is_some() {
                evicted += 1;
            }
        }
        self.counters.record_evictions(evicted);

        SweepReport {
            expired: expired_keys.len(),
            evicted,
            persisted: false,
        }
    }

    // == Length ==
    /// Number of entries held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys from least to most recently accessed.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.lru.iter_oldest_first().map(str::to_string).collect()
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }
}

impl<T> CacheStore<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Creates a store backed by snapshot storage.
    ///
    /// When persistence is enabled the existing snapshot is loaded
    /// immediately; a missing or unreadable snapshot leaves the store empty.
    pub fn with_storage(
        config: CacheConfig,
        storage: Arc<dyn SnapshotStorage>,
    ) -> Result<Self, CacheError> {
        let mut store = Self::new(config)?;
        store.storage = Some(storage);
        if store.config.enable_persistence {
            store.load_snapshot();
        }
        Ok(store)
    }

    fn persistence_target(&self) -> Option<Arc<dyn SnapshotStorage>> {
        if self.config.enable_persistence {
            self.storage.clone()
        } else {
            None
        }
    }

    // == Load Snapshot ==
    /// Merges the stored snapshot into the store, returning entries loaded.
    ///
    /// Failures are logged and treated as "no snapshot available".
    pub fn load_snapshot(&mut self) -> usize {
        let Some(storage) = self.persistence_target() else {
            return 0;
        };

        let payload = match storage.read(&self.config.persistence_key) {
            Ok(Some(payload)) => payload,
            Ok(None) => return 0,
            Err(err) => {
                warn!("Cache snapshot unavailable: {}", err);
                return 0;
            }
        };

        let decoded = match decode_snapshot::<T>(&payload, current_timestamp_ms()) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!("Cache snapshot unreadable, starting empty: {}", err);
                return 0;
            }
        };

        let mut loaded = decoded.entries;
        // Seed the tracker so restored recency matches the stored access times
        loaded.sort_by_key(|(_, entry)| entry.last_accessed);
        let count = loaded.len();
        for (key, entry) in loaded {
            self.lru.touch(&key);
            self.entries.insert(key, entry);
        }

        info!(
            "Loaded {} cache entries from snapshot ({} dropped)",
            count, decoded.dropped
        );
        count
    }

    // == Persist ==
    /// Overwrites the snapshot with the current entries.
    ///
    /// Returns whether the write succeeded; failures are only logged.
    pub fn persist(&self) -> bool {
        let Some(storage) = self.persistence_target() else {
            return false;
        };

        let result = encode_snapshot(&self.entries)
            .and_then(|payload| storage.write(&self.config.persistence_key, &payload));

        match result {
            Ok(()) => true,
            Err(err) => {
                warn!("Failed to write cache snapshot: {}", err);
                false
            }
        }
    }

    // == Run Cleanup ==
    /// Full maintenance pass: sweep, then snapshot the survivors.
    pub fn run_cleanup(&mut self) -> SweepReport {
        let mut report = self.sweep();
        report.persisted = self.persist();
        report
    }
}
