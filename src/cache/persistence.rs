//! Snapshot Persistence Module
//!
//! Best-effort flat key/value storage for the cache snapshot. The snapshot
//! is one JSON object mapping cache key to its serialized [`CacheEntry`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::cache::CacheEntry;
use crate::error::CacheError;

// == Snapshot Storage ==
/// Host-provided flat key/value store holding snapshots.
pub trait SnapshotStorage: Send + Sync + fmt::Debug {
    /// Returns the payload stored under `key`, `None` when nothing is stored.
    fn read(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Replaces the payload stored under `key`.
    fn write(&self, key: &str, payload: &str) -> Result<(), CacheError>;

    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

// == Memory Storage ==
/// Process-local storage, mostly useful in tests and for embedding.
#[derive(Debug, Default)]
pub struct MemorySnapshotStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, CacheError> {
        self.slots
            .lock()
            .map_err(|_| CacheError::Storage("snapshot slots lock poisoned".to_string()))
    }
}

impl SnapshotStorage for MemorySnapshotStorage {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.slots()?.get(key).cloned())
    }

    fn write(&self, key: &str, payload: &str) -> Result<(), CacheError> {
        self.slots()?.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.slots()?.remove(key);
        Ok(())
    }
}

// == File Storage ==
/// Stores each snapshot as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileSnapshotStorage {
    dir: PathBuf,
}

impl FileSnapshotStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl SnapshotStorage for FileSnapshotStorage {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, payload: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        // Write then rename so a crash never leaves a truncated snapshot
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// == Snapshot Codec ==
/// Result of decoding a snapshot payload.
#[derive(Debug)]
pub struct DecodedSnapshot<T> {
    /// Entries still valid at load time
    pub entries: Vec<(String, CacheEntry<T>)>,
    /// Entries skipped because they failed to parse or had expired
    pub dropped: usize,
}

/// Serializes entries into the snapshot payload, ordered by key.
pub fn encode_snapshot<T: Serialize>(
    entries: &HashMap<String, CacheEntry<T>>,
) -> Result<String, CacheError> {
    let ordered: BTreeMap<&str, &CacheEntry<T>> =
        entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
    Ok(serde_json::to_string(&ordered)?)
}

/// Parses a snapshot payload, dropping corrupt or expired records one by one.
///
/// Only a payload that is not a JSON object at all is an error.
pub fn decode_snapshot<T: DeserializeOwned>(
    payload: &str,
    now: u64,
) -> Result<DecodedSnapshot<T>, CacheError> {
    let records: serde_json::Map<String, Value> = serde_json::from_str(payload)?;
    let mut entries = Vec::with_capacity(records.len());
    let mut dropped = 0;

    for (key, record) in records {
        match serde_json::from_value::<CacheEntry<T>>(record) {
            Ok(entry) if entry.is_expired_at(now) => {
                debug!("Snapshot entry '{}' expired before load", key);
                dropped += 1;
            }
            Ok(entry) => entries.push((key, entry)),
            Err(err) => {
                debug!("Snapshot entry '{}' is corrupt: {}", key, err);
                dropped += 1;
            }
        }
    }

    Ok(DecodedSnapshot { entries, dropped })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemorySnapshotStorage::new();
        assert_eq!(storage.read("snap").unwrap(), None);

        storage.write("snap", "{}").unwrap();
        assert_eq!(storage.read("snap").unwrap().as_deref(), Some("{}"));

        storage.remove("snap").unwrap();
        assert_eq!(storage.read("snap").unwrap(), None);
    }

    #[test]
    fn test_file_storage_missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSnapshotStorage::new(dir.path());
        assert_eq!(storage.read("nothing").unwrap(), None);
        storage.remove("nothing").unwrap();
    }

    #[test]
    fn test_file_storage_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSnapshotStorage::new(dir.path().join("nested"));

        storage.write("dash:cache", r#"{"a":1}"#).unwrap();
        storage.write("dash:cache", r#"{"b":2}"#).unwrap();

        assert_eq!(
            storage.read("dash:cache").unwrap().as_deref(),
            Some(r#"{"b":2}"#)
        );
        assert!(dir.path().join("nested").join("dash_cache.json").exists());
    }

    #[test]
    fn test_decode_drops_corrupt_and_expired_records() {
        let payload = json!({
            "fresh": { "value": "ok", "storedAt": 1_000, "ttl": 10_000, "hitCount": 3, "lastAccessed": 1_500 },
            "stale": { "value": "old", "storedAt": 1_000, "ttl": 10, "hitCount": 0, "lastAccessed": 1_000 },
            "broken": { "value": "x", "storedAt": "yesterday" },
            "wrong_type": { "value": 12, "storedAt": 1_000, "ttl": 10_000, "hitCount": 0, "lastAccessed": 1_000 }
        })
        .to_string();

        let decoded: DecodedSnapshot<String> = decode_snapshot(&payload, 2_000).unwrap();

        assert_eq!(decoded.entries.len(), 1);
        assert_eq!(decoded.entries[0].0, "fresh");
        assert_eq!(decoded.entries[0].1.hit_count, 3);
        assert_eq!(decoded.dropped, 3);
    }

    #[test]
    fn test_decode_rejects_non_object_payload() {
        let result: Result<DecodedSnapshot<String>, _> = decode_snapshot("[1,2,3]", 0);
        assert!(matches!(result, Err(CacheError::Encoding(_))));

        let result: Result<DecodedSnapshot<String>, _> = decode_snapshot("not json", 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_then_decode_preserves_metadata() {
        let mut entries = HashMap::new();
        let mut entry = CacheEntry::stored_at(vec![1, 2, 3], 60_000, 100);
        entry.record_hit(150);
        entries.insert("list".to_string(), entry.clone());

        let payload = encode_snapshot(&entries).unwrap();
        let decoded: DecodedSnapshot<Vec<i32>> = decode_snapshot(&payload, 200).unwrap();

        assert_eq!(decoded.entries, vec![("list".to_string(), entry)]);
    }
}
