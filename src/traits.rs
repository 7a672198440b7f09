//! Cache trait hierarchy.
//!
//! A small, layered seam over the cache side of the crate:
//!
//! ```text
//!   ReadOnlyCache<K, V>      contains / len / is_empty / capacity
//!
//!   CoreCache<K, V>          insert / get / contains / len / capacity / clear
//!        │
//!        ▼
//!   MutableCache<K, V>       remove / remove_batch
//! ```
//!
//! [`CoreCache::get`] takes `&mut self` on purpose: a cache read is allowed
//! to update recency state. [`ReadOnlyCache`] is the by-`&self` view for
//! callers that must not perturb eviction order.
//!
//! [`SparseArray`](crate::ds::SparseArray) intentionally sits outside this
//! seam: its keys are fixed 32-bit integers and its mutations are fallible
//! (frozen instances), which no generic cache caller expects.

/// Read-only cache introspection that never touches eviction state.
pub trait ReadOnlyCache<K, V> {
    /// Returns `true` if `key` is cached, without promoting it.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the cache contains no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries.
    fn capacity(&self) -> usize;
}

/// Core operations every cache supports.
///
/// # Example
///
/// ```
/// use sparsekit::policy::SlruCache;
/// use sparsekit::traits::CoreCache;
///
/// fn warm<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.clone());
///     }
/// }
///
/// let mut cache = SlruCache::new(16);
/// warm(&mut cache, &[(1, "one".into()), (2, "two".into())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if the key
    /// was already cached. May evict per the cache's policy.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Returns a reference to the cached value, updating recency state on
    /// a hit.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Returns `true` if `key` is cached, without updating recency state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the cache contains no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries.
    fn capacity(&self) -> usize;

    /// Removes every entry.
    fn clear(&mut self);
}

/// Caches that additionally support arbitrary key-based removal.
///
/// # Example
///
/// ```
/// use sparsekit::policy::SlruCache;
/// use sparsekit::traits::{CoreCache, MutableCache};
///
/// fn invalidate<C: MutableCache<u64, &'static str>>(cache: &mut C, keys: &[u64]) {
///     for key in keys {
///         cache.remove(key);
///     }
/// }
///
/// let mut cache = SlruCache::new(16);
/// cache.put(1, "one");
/// cache.put(2, "two");
/// invalidate(&mut cache, &[1]);
/// assert!(!cache.contains(&1));
/// assert!(cache.contains(&2));
/// ```
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes `key`, returning its value if it was cached.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes several keys, returning the prior values in input order.
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|k| self.remove(k)).collect()
    }
}
