// ==============================================
// MODEL-BASED PROPERTY TESTS
// ==============================================
//
// Property 1: SparseArray agrees with a std HashMap oracle over random
//   put/remove/get sequences. A narrow key domain keeps the table dense and
//   collision-heavy so displacement and backward shifts fire constantly.
//
// Property 2: snapshots are equal to their source and diverge independently.
//
// Property 3: SlruCache never exceeds capacity, keeps its two lists
//   coherent, and any hit returns the last value written for that key.

use std::collections::HashMap;

use proptest::prelude::*;
use sparsekit::ds::SparseArray;
use sparsekit::policy::SlruCache;

proptest! {
    #[test]
    fn prop_sparse_array_matches_hashmap(
        ops in proptest::collection::vec((0u8..3, -24i32..24, any::<i32>()), 1..400),
    ) {
        let mut table: SparseArray<i32> = SparseArray::new();
        let mut model: HashMap<i32, i32> = HashMap::new();

        for (op, key, value) in ops {
            match op {
                0 => {
                    table.put(key, value).unwrap();
                    model.insert(key, value);
                }
                1 => {
                    let removed = table.remove(key).unwrap();
                    prop_assert_eq!(removed, model.remove(&key).is_some());
                }
                _ => {
                    prop_assert_eq!(table.get(key), model.get(&key));
                }
            }
            prop_assert_eq!(table.len(), model.len());
        }

        table
            .check_invariants()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        for (key, value) in &model {
            prop_assert_eq!(table.get(*key), Some(value));
            prop_assert!(table.contains_key(*key));
        }
        prop_assert_eq!(table.keys().len(), model.len());
        prop_assert_eq!(table.values().count(), model.len());
    }

    #[test]
    fn prop_snapshot_is_equal_then_independent(
        entries in proptest::collection::hash_map(-1_000i32..1_000, any::<i32>(), 0..80),
        extra_key in 2_000i32..3_000,
    ) {
        let mut source: SparseArray<i32> = SparseArray::new();
        for (&key, &value) in &entries {
            source.put(key, value).unwrap();
        }

        let mut copy = source.snapshot();
        prop_assert_eq!(&copy, &source);
        copy.check_invariants()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        copy.put(extra_key, 1).unwrap();
        prop_assert_ne!(&copy, &source);
        prop_assert_eq!(source.len(), entries.len());
        prop_assert_eq!(source.get(extra_key), None);
    }

    #[test]
    fn prop_slru_is_bounded_and_coherent(
        cap in 1usize..32,
        ops in proptest::collection::vec((0u8..4, 0u16..64), 1..400),
    ) {
        let mut cache: SlruCache<u16, u32> = SlruCache::new(cap);
        // Last value written per key; evictions may drop keys from the
        // cache, but a hit must never surface a stale value.
        let mut written: HashMap<u16, u32> = HashMap::new();
        let mut clock: u32 = 0;

        for (op, key) in ops {
            match op {
                0 | 1 => {
                    clock += 1;
                    cache.put(key, clock);
                    written.insert(key, clock);
                }
                2 => {
                    let hit = cache.get(&key).copied();
                    if let Some(value) = hit {
                        prop_assert_eq!(written.get(&key).copied(), Some(value));
                    }
                }
                _ => {
                    if let Some(value) = cache.remove(&key) {
                        prop_assert_eq!(written.get(&key).copied(), Some(value));
                    }
                    written.remove(&key);
                }
            }
            prop_assert!(cache.len() <= cap);
            prop_assert_eq!(
                cache.len(),
                cache.single_use_len() + cache.multi_use_len()
            );
        }

        cache
            .check_invariants()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
    }
}
