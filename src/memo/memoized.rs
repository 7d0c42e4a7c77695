//! Memoized Function Module
//!
//! Wraps a computation with its own bounded cache.

use std::convert::Infallible;
use std::fmt::Debug;
use std::hash::Hash;
use std::num::NonZeroUsize;

use serde_json::{Map, Value};
use tracing::debug;

use crate::cache::{CacheStats, MemoStore};
use crate::error::MemoError;
use crate::memo::CallKey;

// == Lookup ==
/// Result of a memoized call, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// Served from the cache without running the computation
    Hit(V),
    /// Freshly computed and stored
    Miss(V),
}

impl<V> Lookup<V> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    pub fn value(&self) -> &V {
        match self {
            Lookup::Hit(v) | Lookup::Miss(v) => v,
        }
    }

    pub fn into_value(self) -> V {
        match self {
            Lookup::Hit(v) | Lookup::Miss(v) => v,
        }
    }
}

// == Memoized ==
/// A computation together with the cache that remembers its results.
///
/// Each wrapper owns its cache; two wrappers never share entries even when
/// called with identical arguments. Only successful results are stored, so a
/// failing call is retried the next time it is made.
///
/// Keys must be `Hash + Eq`: any argument type that can be compared for
/// equality and hashed stably is accepted. Dynamic arguments go through
/// [`CallKey`], which rejects values without a stable identity.
pub struct Memoized<K, V, F> {
    /// Label used in log events
    name: String,
    /// Results keyed by argument signature
    store: MemoStore<K, V>,
    /// The wrapped computation
    func: F,
}

impl<K, V, F> Memoized<K, V, F>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    // == Constructor ==
    /// Wraps `func` with a cache holding at most `capacity` signatures.
    ///
    /// # Arguments
    /// * `func` - The computation to memoize
    /// * `capacity` - Maximum number of cached signatures, None for unbounded
    pub fn new(func: F, capacity: Option<NonZeroUsize>) -> Self {
        Self::named("memoized", func, capacity)
    }

    /// Same as `new`, with a name that appears in log events.
    pub fn named(name: impl Into<String>, func: F, capacity: Option<NonZeroUsize>) -> Self {
        Self {
            name: name.into(),
            store: MemoStore::new(capacity),
            func,
        }
    }

    /// Wraps `func` with a cache that never evicts.
    pub fn unbounded(func: F) -> Self {
        Self::new(func, None)
    }

    // == Core ==
    fn run<E>(
        &mut self,
        key: K,
        compute: impl FnOnce(&mut F, &K) -> Result<V, E>,
    ) -> Result<Lookup<V>, E> {
        if let Some(value) = self.store.lookup(&key).cloned() {
            debug!(cache = %self.name, key = ?key, "cache hit");
            return Ok(Lookup::Hit(value));
        }

        debug!(cache = %self.name, key = ?key, "cache miss, computing");
        let value = compute(&mut self.func, &key)?;

        if let Some(evicted) = self.store.insert(key, value.clone()) {
            debug!(cache = %self.name, evicted = ?evicted, "evicted oldest entry");
        }

        Ok(Lookup::Miss(value))
    }

    // == Invoke ==
    /// Returns the cached result for `key`, computing and storing it on a miss.
    pub fn invoke(&mut self, key: K) -> V
    where
        F: FnMut(&K) -> V,
    {
        self.invoke_traced(key).into_value()
    }

    /// Like `invoke`, reporting whether the result was a hit or a miss.
    pub fn invoke_traced(&mut self, key: K) -> Lookup<V>
    where
        F: FnMut(&K) -> V,
    {
        match self.run(key, |func, key| Ok::<V, Infallible>(func(key))) {
            Ok(lookup) => lookup,
            Err(never) => match never {},
        }
    }

    // == Try Invoke ==
    /// Fallible variant of `invoke`.
    ///
    /// An error from the computation is returned as is and nothing is cached.
    pub fn try_invoke<E>(&mut self, key: K) -> Result<V, E>
    where
        F: FnMut(&K) -> Result<V, E>,
    {
        self.try_invoke_traced(key).map(Lookup::into_value)
    }

    /// Like `try_invoke`, reporting whether the result was a hit or a miss.
    pub fn try_invoke_traced<E>(&mut self, key: K) -> Result<Lookup<V>, E>
    where
        F: FnMut(&K) -> Result<V, E>,
    {
        self.run(key, |func, key| func(key))
    }

    // == Inspection ==
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a result for `key` is currently cached. Does not count as a hit.
    pub fn contains(&self, key: &K) -> bool {
        self.store.contains(key)
    }

    /// Cached keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.store.keys()
    }

    /// Cached `(key, value)` pairs from oldest to newest insertion.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        self.store.snapshot()
    }

    /// Read-only view of the underlying store.
    pub fn store(&self) -> &MemoStore<K, V> {
        &self.store
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.store.capacity()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Forgets every cached result.
    pub fn clear(&mut self) {
        self.store.clear();
    }
}

impl<V, F> Memoized<CallKey, V, F>
where
    V: Clone,
{
    // == Call ==
    /// Memoized call with dynamic positional and keyword arguments.
    ///
    /// Fails with `MemoError::UncacheableKey` (converted into `E`) before
    /// running anything if an argument cannot be canonicalized.
    pub fn call<E>(&mut self, args: &[Value], kwargs: &Map<String, Value>) -> Result<V, E>
    where
        F: FnMut(&CallKey) -> Result<V, E>,
        E: From<MemoError>,
    {
        self.call_traced(args, kwargs).map(Lookup::into_value)
    }

    /// Like `call`, reporting whether the result was a hit or a miss.
    pub fn call_traced<E>(
        &mut self,
        args: &[Value],
        kwargs: &Map<String, Value>,
    ) -> Result<Lookup<V>, E>
    where
        F: FnMut(&CallKey) -> Result<V, E>,
        E: From<MemoError>,
    {
        let key = CallKey::canonicalize(args, kwargs)?;
        self.try_invoke_traced(key)
    }
}
