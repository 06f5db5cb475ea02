//! Cache Cleanup Task
//!
//! Background task that periodically sweeps the cache: expired entries go
//! first, then least recently accessed ones until capacity is respected,
//! then the snapshot is rewritten when persistence is on.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that runs a cleanup pass every `interval`.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = SharedCache::new(CacheStore::new(CacheConfig::default())?);
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<T>(cache: SharedCache<T>, interval: Duration) -> JoinHandle<()>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting cache cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let report = cache.run_cleanup().await;

            if report.expired > 0 || report.evicted > 0 {
                info!(
                    "Cache cleanup: removed {} expired, evicted {} entries",
                    report.expired, report.evicted
                );
            } else {
                debug!("Cache cleanup: nothing to remove");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, MemorySnapshotStorage, SnapshotStorage};
    use crate::config::CacheConfig;
    use std::sync::Arc;

    fn shared(max_size: usize) -> SharedCache<String> {
        SharedCache::new(
            CacheStore::new(CacheConfig {
                max_size,
                ..CacheConfig::default()
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = shared(100);
        cache.set("expire_soon", "value".to_string(), Some(10)).await;

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(30));
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(cache.stats().await.size, 0);
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_enforces_capacity() {
        let cache = shared(2);
        cache.set("a", "1".to_string(), None).await;
        cache.set("b", "2".to_string(), None).await;
        cache.get("a").await;
        cache.set("c", "3".to_string(), None).await;

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert!(cache.has("a").await);
        assert!(!cache.has("b").await);
        assert!(cache.has("c").await);
    }

    #[tokio::test]
    async fn test_cleanup_task_writes_snapshot() {
        let storage = Arc::new(MemorySnapshotStorage::new());
        let config = CacheConfig {
            enable_persistence: true,
            persistence_key: "task_snapshot".to_string(),
            ..CacheConfig::default()
        };
        let cache = SharedCache::new(
            CacheStore::<String>::with_storage(config, storage.clone()).unwrap(),
        );
        cache.set("kept", "v".to_string(), None).await;

        let handle = spawn_cleanup_task(cache, Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        let payload = storage.read("task_snapshot").unwrap();
        assert!(payload.is_some_and(|p| p.contains("kept")));
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cleanup_task(shared(10), Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
