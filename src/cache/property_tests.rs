//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's invariants over random operation
//! sequences.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::cache::Cache;
use crate::config::CacheConfig;

// == Test Configuration ==
const TEST_MAX_SIZE: usize = 100;

fn store(max_size: usize) -> Cache<String> {
    Cache::new(CacheConfig::new("prop").with_max_size(max_size)).unwrap()
}

// == Strategies ==
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:-]{1,32}"
}

fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,64}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Has { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Has { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hit/miss counters and access counts agree with what reads observed.
    #[test]
    fn prop_access_accounting(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut cache = store(TEST_MAX_SIZE);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;
        let mut last_total = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => cache.set(&key, value, None),
                CacheOp::Get { key } => match cache.get(&key) {
                    Some(_) => {
                        expected_hits += 1;
                        let total = cache.stats().total_access_count;
                        prop_assert!(total > last_total, "hit must raise total access count");
                    }
                    None => expected_misses += 1,
                },
                CacheOp::Has { key } => {
                    cache.has(&key);
                }
                CacheOp::Delete { key } => {
                    cache.delete(&key);
                }
            }
            let stats = cache.stats();
            let summed: u64 = cache
                .keys()
                .iter()
                .map(|k| cache.peek_entry(k).unwrap().access_count)
                .sum();
            prop_assert_eq!(stats.total_access_count, summed);
            last_total = stats.total_access_count;
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.size, cache.len());
    }

    // The store behaves like a map while nothing is evicted or expired.
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut cache = store(TEST_MAX_SIZE);
        let mut model: HashMap<String, String> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(&key, value.clone(), None);
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key), model.get(&key).cloned());
                }
                CacheOp::Has { key } => {
                    prop_assert_eq!(cache.has(&key), model.contains_key(&key));
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(cache.delete(&key), model.remove(&key).is_some());
                }
            }
        }

        let mut expected: Vec<String> = model.into_keys().collect();
        expected.sort();
        prop_assert_eq!(cache.keys(), expected);
    }

    // Overwriting leaves one entry holding the newest value.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let mut cache = store(TEST_MAX_SIZE);

        cache.set(&key, value1, None);
        cache.set(&key, value2.clone(), None);

        prop_assert_eq!(cache.len(), 1);
        prop_assert_eq!(cache.get(&key), Some(value2));
    }

    // Size never exceeds max_size after a set.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec(
            (valid_key_strategy(), valid_value_strategy()),
            1..200
        )
    ) {
        let max_size = 20;
        let mut cache = store(max_size);

        for (key, value) in entries {
            cache.set(&key, value, None);
            prop_assert!(cache.len() <= max_size);
        }
    }

    // Inserting into a full cache evicts exactly the least recently read key.
    #[test]
    fn prop_lru_eviction_order(
        keys in prop::collection::hash_set(valid_key_strategy(), 3..10),
        reads in prop::collection::vec(0usize..100, 0..20),
        new_key in valid_key_strategy(),
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        prop_assume!(!keys.contains(&new_key));

        let mut cache = store(keys.len());
        for key in &keys {
            cache.set(key, format!("value_{key}"), None);
        }

        // Recency order, oldest first
        let mut order = keys.clone();
        for index in reads {
            let key = keys[index % keys.len()].clone();
            cache.get(&key);
            order.retain(|k| *k != key);
            order.push(key);
        }

        cache.set(&new_key, "new".to_string(), None);

        let evicted = &order[0];
        prop_assert_eq!(cache.len(), keys.len());
        prop_assert!(!cache.has(evicted), "'{}' should have been evicted", evicted);
        for key in order.iter().skip(1) {
            prop_assert!(cache.has(key), "'{}' should still exist", key);
        }
        prop_assert!(cache.has(&new_key));
    }

    // Two caches with different namespaces never see each other's keys.
    #[test]
    fn prop_namespace_isolation(
        keys in prop::collection::hash_set(valid_key_strategy(), 1..20)
    ) {
        let mut left: Cache<String> = Cache::new(CacheConfig::new("left")).unwrap();
        let mut right: Cache<String> = Cache::new(CacheConfig::new("right")).unwrap();

        for key in &keys {
            left.set(key, format!("left-{key}"), None);
            right.set(key, format!("right-{key}"), None);
        }

        let seen: HashSet<String> = left.keys().into_iter().collect();
        prop_assert_eq!(&seen, &keys);
        for key in &keys {
            prop_assert_eq!(left.get(key), Some(format!("left-{key}")));
            prop_assert_eq!(right.get(key), Some(format!("right-{key}")));
        }
    }
}
