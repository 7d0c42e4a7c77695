//! Shared Memoized Function Module
//!
//! Async, lock-guarded variant of [`Memoized`](crate::memo::Memoized) for
//! concurrent callers.
//!
//! One mutex guards the store for the whole call: lookup, computation,
//! insertion and eviction happen under the same lock, so a signature is never
//! computed twice while it is cached and the eviction order stays the order
//! in which results were inserted.

use std::convert::Infallible;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheStats, MemoStore};
use crate::memo::Lookup;

// == Shared Memoized ==
/// Cloneable handle to an async computation and its cache.
///
/// Clones share the same cache. Separately constructed handles do not.
pub struct SharedMemoized<K, V, F> {
    name: Arc<str>,
    store: Arc<Mutex<MemoStore<K, V>>>,
    func: Arc<F>,
}

impl<K, V, F> Clone for SharedMemoized<K, V, F> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            store: Arc::clone(&self.store),
            func: Arc::clone(&self.func),
        }
    }
}

impl<K, V, F> SharedMemoized<K, V, F>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    // == Constructor ==
    /// Wraps an async computation with a cache holding at most `capacity` signatures.
    pub fn new(func: F, capacity: Option<NonZeroUsize>) -> Self {
        Self::named("shared", func, capacity)
    }

    /// Same as `new`, with a name that appears in log events.
    pub fn named(name: &str, func: F, capacity: Option<NonZeroUsize>) -> Self {
        Self {
            name: Arc::from(name),
            store: Arc::new(Mutex::new(MemoStore::new(capacity))),
            func: Arc::new(func),
        }
    }

    // == Core ==
    async fn run<E, C, CF>(&self, key: K, compute: C) -> Result<Lookup<V>, E>
    where
        C: FnOnce(K) -> CF,
        CF: Future<Output = Result<V, E>>,
    {
        let mut store = self.store.lock().await;

        if let Some(value) = store.lookup(&key).cloned() {
            debug!(cache = %self.name, key = ?key, "cache hit");
            return Ok(Lookup::Hit(value));
        }

        debug!(cache = %self.name, key = ?key, "cache miss, computing");
        let value = compute(key.clone()).await?;

        if let Some(evicted) = store.insert(key, value.clone()) {
            debug!(cache = %self.name, evicted = ?evicted, "evicted oldest entry");
        }

        Ok(Lookup::Miss(value))
    }

    // == Try Invoke ==
    /// Returns the cached result for `key`, awaiting the computation on a miss.
    ///
    /// Other callers wait on the lock while the computation runs. Errors are
    /// returned unchanged and never cached.
    pub async fn try_invoke_traced<E, Fut>(&self, key: K) -> Result<Lookup<V>, E>
    where
        F: Fn(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.run(key, |key| (self.func)(key)).await
    }

    pub async fn try_invoke<E, Fut>(&self, key: K) -> Result<V, E>
    where
        F: Fn(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.try_invoke_traced(key).await.map(Lookup::into_value)
    }

    // == Invoke ==
    /// Infallible variant of `try_invoke_traced`.
    pub async fn invoke_traced<Fut>(&self, key: K) -> Lookup<V>
    where
        F: Fn(K) -> Fut,
        Fut: Future<Output = V>,
    {
        let compute = |key: K| async move { Ok::<V, Infallible>((self.func)(key).await) };
        match self.run(key, compute).await {
            Ok(lookup) => lookup,
            Err(never) => match never {},
        }
    }

    pub async fn invoke<Fut>(&self, key: K) -> V
    where
        F: Fn(K) -> Fut,
        Fut: Future<Output = V>,
    {
        self.invoke_traced(key).await.into_value()
    }

    // == Inspection ==
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn contains(&self, key: &K) -> bool {
        self.store.lock().await.contains(key)
    }

    /// Cached keys from oldest to newest insertion.
    pub async fn keys(&self) -> Vec<K> {
        self.store.lock().await.keys().cloned().collect()
    }

    /// Cached `(key, value)` pairs from oldest to newest insertion.
    pub async fn snapshot(&self) -> Vec<(K, V)> {
        self.store.lock().await.snapshot()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.lock().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn clear(&self) {
        self.store.lock().await.clear();
    }
}
