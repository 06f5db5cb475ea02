//! Cache Module
//!
//! Provides in-memory caching with lazy TTL expiration, a periodic sweep
//! with least-recently-accessed eviction, and an optional snapshot.

mod entry;
mod lru;
mod pattern;
mod persistence;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use lru::LruTracker;
pub use pattern::KeyPattern;
pub use persistence::{
    decode_snapshot, encode_snapshot, DecodedSnapshot, FileSnapshotStorage,
    MemorySnapshotStorage, SnapshotStorage,
};
pub use shared::SharedCache;
pub use stats::{CacheCounters, CacheStats};
pub use store::{CacheStore, SweepReport};
