//! LRU Tracker Module
//!
//! Orders keys by their most recent access for least-recently-accessed
//! eviction.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks access order for LRU eviction.
///
/// Every touch stamps the key with a fresh sequence number, so iterating the
/// sequence map in ascending order yields keys from least to most recently
/// accessed. Two accesses inside the same millisecond are still ordered.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Sequence number -> key, ascending = oldest first
    order: BTreeMap<u64, String>,
    /// Key -> its current sequence number
    positions: HashMap<String, u64>,
    /// Next sequence number to hand out
    next_seq: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as the most recently accessed.
    pub fn touch(&mut self, key: &str) {
        let seq = self.next_seq;
        self.next_seq += 1;

        if let Some(old) = self.positions.insert(key.to_string(), seq) {
            self.order.remove(&old);
        }
        self.order.insert(seq, key.to_string());
    }

    // == Remove ==
    /// Stops tracking a key.
    pub fn remove(&mut self, key: &str) {
        if let Some(seq) = self.positions.remove(key) {
            self.order.remove(&seq);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently accessed key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.positions.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently accessed key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.values().next().map(String::as_str)
    }

    /// Keys from least to most recently accessed.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &str> {
        self.order.values().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }
}
