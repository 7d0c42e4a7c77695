//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check eviction and statistics invariants of the store
//! and the memoizing wrapper built on it.

use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;

use serde_json::{Map, Value};

use crate::cache::MemoStore;
use crate::memo::{CallKey, Memoized};

// == Strategies ==
/// Generates small argument values so sequences repeat often
fn arg_strategy() -> impl Strategy<Value = u8> {
    0u8..16
}

fn capacity_strategy() -> impl Strategy<Value = NonZeroUsize> {
    (1usize..8).prop_map(|n| NonZeroUsize::new(n).unwrap())
}

/// Generates a list of distinct keys in a random order
fn distinct_keys_strategy() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::hash_set(any::<u32>(), 1..40)
        .prop_flat_map(|set| Just(set.into_iter().collect::<Vec<_>>()).prop_shuffle())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The store never holds more than `capacity` entries after any insert.
    #[test]
    fn prop_capacity_bound(
        capacity in capacity_strategy(),
        keys in prop::collection::vec(arg_strategy(), 1..200)
    ) {
        let mut store = MemoStore::new(Some(capacity));

        for key in keys {
            if store.lookup(&key).is_none() {
                store.insert(key, key as u32 * 2);
            }
            prop_assert!(
                store.len() <= capacity.get(),
                "Cache size {} exceeds capacity {}",
                store.len(),
                capacity
            );
        }
    }

    // After inserting m distinct keys, exactly the last `capacity` remain, in order.
    #[test]
    fn prop_fifo_survivors(
        capacity in capacity_strategy(),
        keys in distinct_keys_strategy()
    ) {
        let mut store = MemoStore::new(Some(capacity));
        for key in &keys {
            store.insert(*key, ());
        }

        let expected: Vec<u32> = keys
            .iter()
            .skip(keys.len().saturating_sub(capacity.get()))
            .copied()
            .collect();
        let actual: Vec<u32> = store.keys().copied().collect();
        prop_assert_eq!(actual, expected);
    }

    // Hits between insertions never change which entries get evicted.
    #[test]
    fn prop_hits_do_not_reorder(
        capacity in capacity_strategy(),
        keys in distinct_keys_strategy(),
        hit_pattern in prop::collection::vec(any::<prop::sample::Index>(), 0..40)
    ) {
        let mut with_hits = MemoStore::new(Some(capacity));
        let mut without_hits = MemoStore::new(Some(capacity));

        for (i, key) in keys.iter().enumerate() {
            with_hits.insert(*key, ());
            without_hits.insert(*key, ());

            if let Some(index) = hit_pattern.get(i) {
                let present: Vec<u32> = with_hits.keys().copied().collect();
                let target = present[index.index(present.len())];
                prop_assert!(with_hits.lookup(&target).is_some());
            }
        }

        let a: Vec<u32> = with_hits.keys().copied().collect();
        let b: Vec<u32> = without_hits.keys().copied().collect();
        prop_assert_eq!(a, b);
    }

    // The wrapper computes exactly once per miss and the stats agree with a model.
    #[test]
    fn prop_memoized_matches_fifo_model(
        capacity in capacity_strategy(),
        calls in prop::collection::vec(arg_strategy(), 1..100)
    ) {
        let computed = RefCell::new(0u64);
        let mut memo = Memoized::new(
            |a: &u8| {
                *computed.borrow_mut() += 1;
                *a as u64 * *a as u64
            },
            Some(capacity),
        );

        // Reference model: insertion-ordered Vec
        let mut model: Vec<u8> = Vec::new();
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;
        let mut expected_evictions = 0u64;

        for a in calls {
            let lookup = memo.invoke_traced(a);
            prop_assert_eq!(*lookup.value(), a as u64 * a as u64);

            if model.contains(&a) {
                expected_hits += 1;
                prop_assert!(lookup.is_hit());
            } else {
                expected_misses += 1;
                prop_assert!(!lookup.is_hit());
                model.push(a);
                if model.len() > capacity.get() {
                    model.remove(0);
                    expected_evictions += 1;
                }
            }
        }

        let stats = memo.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.evictions, expected_evictions, "Evictions mismatch");
        prop_assert_eq!(*computed.borrow(), expected_misses, "Computation count mismatch");
        prop_assert_eq!(memo.keys().copied().collect::<Vec<_>>(), model);
    }

    // Keyword argument order never changes the key.
    #[test]
    fn prop_kwargs_order_independent(
        kwargs in prop::collection::hash_map("[a-z]{1,6}", any::<i64>(), 0..8),
        args in prop::collection::vec(any::<i64>(), 0..4)
    ) {
        let args: Vec<Value> = args.into_iter().map(Value::from).collect();
        let mut pairs: Vec<(String, i64)> = kwargs.into_iter().collect();

        let forward: Map<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(*v)))
            .collect();
        pairs.reverse();
        let backward: Map<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(*v)))
            .collect();

        let a = CallKey::canonicalize(&args, &forward).unwrap();
        let b = CallKey::canonicalize(&args, &backward).unwrap();
        prop_assert_eq!(a, b);
    }

    // Unbounded stores keep every distinct key.
    #[test]
    fn prop_unbounded_keeps_everything(keys in prop::collection::vec(any::<u16>(), 0..300)) {
        let mut store = MemoStore::unbounded();
        let mut distinct = HashSet::new();
        let mut last_value = HashMap::new();

        for (i, key) in keys.into_iter().enumerate() {
            if store.lookup(&key).is_none() {
                store.insert(key, i);
                last_value.insert(key, i);
            }
            distinct.insert(key);
        }

        prop_assert_eq!(store.len(), distinct.len());
        prop_assert_eq!(store.stats().evictions, 0);
        for (key, value) in last_value {
            prop_assert_eq!(store.peek(&key), Some(&value));
        }
    }
}
