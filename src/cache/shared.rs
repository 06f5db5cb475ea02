//! Shared Cache Handle
//!
//! Async wrapper around [`CacheStore`] for use from handlers and services.
//! The store lock is never held while a producer runs.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Mutex as AsyncMutex, RwLock};

use crate::cache::{CacheStats, CacheStore, KeyPattern, SweepReport};

type InFlight = Arc<AsyncMutex<()>>;

/// Cloneable handle to one cache store.
#[derive(Debug)]
pub struct SharedCache<T> {
    store: Arc<RwLock<CacheStore<T>>>,
    /// Per-key gates used only by `get_or_set_coalesced`
    in_flight: Arc<Mutex<HashMap<String, InFlight>>>,
}

impl<T> Clone for SharedCache<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<T: Clone> SharedCache<T> {
    pub fn new(store: CacheStore<T>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Direct access to the underlying lock.
    pub fn store(&self) -> &Arc<RwLock<CacheStore<T>>> {
        &self.store
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        self.store.write().await.get(key)
    }

    pub async fn set(&self, key: impl Into<String>, value: T, ttl: Option<u64>) {
        self.store.write().await.set(key, value, ttl);
    }

    pub async fn has(&self, key: &str) -> bool {
        self.store.write().await.has(key)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    pub async fn invalidate_pattern(&self, pattern: impl Into<KeyPattern>) -> usize {
        self.store.write().await.invalidate_pattern(pattern)
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn sweep(&self) -> SweepReport {
        self.store.write().await.sweep()
    }

    // == Get Or Set ==
    /// Returns the cached value, or runs `producer` once and caches its
    /// result.
    ///
    /// Concurrent misses on the same key each run their own producer; use
    /// [`SharedCache::get_or_set_coalesced`] to share one run. A producer
    /// error is returned unchanged and nothing is cached.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        producer: F,
        ttl: Option<u64>,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let cached = self.store.write().await.get(key);
        if let Some(value) = cached {
            return Ok(value);
        }

        let value = producer().await?;
        self.store.write().await.set(key, value.clone(), ttl);
        Ok(value)
    }

    // == Get Or Set (coalesced) ==
    /// Like [`SharedCache::get_or_set`], but concurrent misses on one key
    /// wait for a single producer run.
    ///
    /// If the running producer fails, the next waiter runs its own.
    pub async fn get_or_set_coalesced<F, Fut, E>(
        &self,
        key: &str,
        producer: F,
        ttl: Option<u64>,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let cached = self.store.write().await.get(key);
        if let Some(value) = cached {
            return Ok(value);
        }

        let guard = self.gate_for(key);
        let _turn = guard.gate.lock().await;

        // A waiter that finds the value counts a hit; the miss was counted above
        let cached = {
            let mut store = self.store.write().await;
            if store.has(key) {
                store.get(key)
            } else {
                None
            }
        };
        if let Some(value) = cached {
            return Ok(value);
        }

        let value = producer().await?;
        self.store.write().await.set(key, value.clone(), ttl);
        Ok(value)
    }

    fn gate_for<'a>(&'a self, key: &'a str) -> GateGuard<'a> {
        let mut gates = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let gate = Arc::clone(gates.entry(key.to_string()).or_default());
        GateGuard {
            key,
            gate,
            in_flight: &self.in_flight,
        }
    }
}

/// Holds one caller's claim on a key's gate. Dropping it, on completion or
/// cancellation, removes the gate once no other caller holds it.
struct GateGuard<'a> {
    key: &'a str,
    gate: InFlight,
    in_flight: &'a Mutex<HashMap<String, InFlight>>,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        let mut gates = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let ours = gates
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, &self.gate));
        // Map plus this guard: nobody else is waiting on this key
        if ours && Arc::strong_count(&self.gate) <= 2 {
            gates.remove(self.key);
        }
    }
}

impl<T> SharedCache<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Sweep plus snapshot, see [`CacheStore::run_cleanup`].
    pub async fn run_cleanup(&self) -> SweepReport {
        self.store.write().await.run_cleanup()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn shared() -> SharedCache<String> {
        SharedCache::new(CacheStore::new(CacheConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn test_get_or_set_runs_producer_once_on_hit() {
        let cache = shared();
        let calls = AtomicUsize::new(0);

        let first: Result<String, ()> = cache
            .get_or_set(
                "k",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("fetched".to_string())
                },
                None,
            )
            .await;
        let second: Result<String, ()> = cache
            .get_or_set(
                "k",
                || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("refetched".to_string())
                },
                None,
            )
            .await;

        assert_eq!(first.unwrap(), "fetched");
        assert_eq!(second.unwrap(), "fetched");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_set_propagates_producer_error() {
        let cache = shared();

        let result: Result<String, &str> = cache
            .get_or_set("k", || async { Err("backend down") }, None)
            .await;

        assert_eq!(result, Err("backend down"));
        assert!(!cache.has("k").await);
    }

    #[tokio::test]
    async fn test_get_or_set_does_not_coalesce() {
        let cache = shared();
        let calls = Arc::new(AtomicUsize::new(0));

        let producer = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<_, ()>("v".to_string())
            }
        };

        let (a, b) = tokio::join!(
            cache.get_or_set("k", producer(calls.clone()), None),
            cache.get_or_set("k", producer(calls.clone()), None),
        );

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_coalesced_shares_one_producer_run() {
        let cache = shared();
        let calls = Arc::new(AtomicUsize::new(0));

        let producer = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<_, ()>("v".to_string())
            }
        };

        let (a, b, c) = tokio::join!(
            cache.get_or_set_coalesced("k", producer(calls.clone()), None),
            cache.get_or_set_coalesced("k", producer(calls.clone()), None),
            cache.get_or_set_coalesced("k", producer(calls.clone()), None),
        );

        assert_eq!(a.unwrap(), "v");
        assert_eq!(b.unwrap(), "v");
        assert_eq!(c.unwrap(), "v");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.in_flight.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_coalesced_retries_after_failure() {
        let cache = shared();

        let failed: Result<String, &str> = cache
            .get_or_set_coalesced("k", || async { Err("boom") }, None)
            .await;
        let recovered: Result<String, &str> = cache
            .get_or_set_coalesced("k", || async { Ok("ok".to_string()) }, None)
            .await;

        assert!(failed.is_err());
        assert_eq!(recovered.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_cancelled_coalesced_calls_release_their_gates() {
        let cache = shared();

        for i in 0..100 {
            let key = format!("slow:{i}");
            let call = cache.get_or_set_coalesced(
                &key,
                || async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, ()>("late".to_string())
                },
                None,
            );
            let outcome = tokio::time::timeout(Duration::from_millis(1), call).await;
            assert!(outcome.is_err());
        }

        assert!(cache.in_flight.lock().unwrap().is_empty());
        assert_eq!(cache.stats().await.size, 0);
    }

    #[tokio::test]
    async fn test_coalesced_miss_is_counted_once() {
        let cache = shared();

        cache
            .get_or_set_coalesced("k", || async { Ok::<_, ()>("v".to_string()) }, None)
            .await
            .unwrap();
        assert_eq!(cache.stats().await.misses, 1);

        cache
            .get_or_set_coalesced("k", || async { Ok::<_, ()>("w".to_string()) }, None)
            .await
            .unwrap();
        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_hits, 1);
    }

    #[tokio::test]
    async fn test_clones_share_the_store() {
        let cache = shared();
        let other = cache.clone();

        cache.set("user:1", "a".to_string(), None).await;
        cache.set("user:2", "b".to_string(), None).await;
        cache.set("post:1", "c".to_string(), None).await;

        assert_eq!(other.invalidate_pattern("user:").await, 2);
        assert_eq!(cache.stats().await.size, 1);
        assert!(other.delete("post:1").await);
        assert_eq!(cache.get("post:1").await, None);
    }
}
