//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and access
//! metadata. The serialized form doubles as the snapshot record.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// Insertion timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Lifetime in milliseconds, measured from `stored_at`
    pub ttl: u64,
    /// Successful reads since insertion
    pub hit_count: u64,
    /// Timestamp of the most recent successful read (Unix milliseconds)
    pub last_accessed: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry stored now.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_ms` - Lifetime in milliseconds
    pub fn new(value: T, ttl_ms: u64) -> Self {
        Self::stored_at(value, ttl_ms, current_timestamp_ms())
    }

    /// Creates a new cache entry with an explicit insertion time.
    pub fn stored_at(value: T, ttl_ms: u64, now: u64) -> Self {
        Self {
            value,
            stored_at: now,
            ttl: ttl_ms,
            hit_count: 0,
            last_accessed: now,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once its age is strictly greater than its TTL, so
    /// an entry read exactly `ttl` milliseconds after insertion is still valid.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Same as [`CacheEntry::is_expired`] against a caller-supplied clock.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.age_at(now) > self.ttl
    }

    /// Milliseconds since insertion; zero if the clock moved backwards.
    pub fn age_at(&self, now: u64) -> u64 {
        now.saturating_sub(self.stored_at)
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, zero once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        let now = current_timestamp_ms();
        self.ttl.saturating_sub(self.age_at(now))
    }

    // == Record Hit ==
    /// Registers a successful read.
    pub fn record_hit(&mut self, now: u64) {
        self.hit_count += 1;
        self.last_accessed = now;
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
