//! Segmented LRU (SLRU) cache.
//!
//! Bounded key/value map with a two-list admission/promotion policy. Plain
//! LRU lets a single one-pass scan evict the entire working set; splitting
//! recency into a *single-use* and a *multi-use* list means an entry must be
//! reused to earn long-term retention.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId> ───► arena: SlotArena<Entry<K, V>>
//!
//!   SINGLE-USE (insertion order)        MULTI-USE (recency order)
//!   front ► oldest ... newest ◄ back    front ► LRU ... MRU ◄ back
//!   new keys land here                  reuse (get / overwrite) lands here
//! ```
//!
//! Both lists share the one entry arena, so promotion is a detach and
//! re-append of the same slot: the entry is never copied and its `SlotId`
//! stays valid.
//!
//! ## Eviction
//!
//! Eviction happens only when a *new* key arrives at capacity, and removes
//! exactly one victim: the single-use front when that segment holds at
//! least `max_size / 4` entries, otherwise the multi-use front. The quota
//! caps how much of the cache unproven entries may occupy before they start
//! paying for admissions, bounding scan pollution.
//!
//! ## Operations
//!
//! | Operation  | Time  | Notes                                   |
//! |------------|-------|-----------------------------------------|
//! | `get`      | O(1)  | Hit promotes to the multi-use list      |
//! | `put`      | O(1)  | May evict one victim first              |
//! | `remove`   | O(1)  | Detaches from whichever list holds it   |
//! | `contains` | O(1)  | Index lookup only, no promotion         |
//! | `clear`    | O(n)  | Drops entries, resets both lists        |
//!
//! ## Example
//!
//! ```
//! use sparsekit::policy::SlruCache;
//!
//! let mut cache = SlruCache::new(2);
//! cache.put(1, "one");
//! cache.put(2, "two");
//!
//! // Reuse moves key 1 to the multi-use list...
//! assert_eq!(cache.get(&1), Some(&"one"));
//!
//! // ...so the unproven key 2 is the eviction victim.
//! cache.put(3, "three");
//! assert_eq!(cache.get(&2), None);
//! assert_eq!(cache.get(&1), Some(&"one"));
//! assert_eq!(cache.len(), 2);
//! ```
//!
//! ## Thread Safety
//!
//! Not thread-safe; wrap in external synchronization for concurrent use.
//!
//! ## References
//!
//! - Karedla et al., "Caching Strategies to Improve Disk System
//!   Performance", 1994

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::recency_list::{Linked, Links, RecencyList};
use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::{ConfigError, InvariantError};
use crate::traits::{CoreCache, MutableCache, ReadOnlyCache};

/// Which recency list an entry currently sits on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Segment {
    /// Inserted once, not yet reused.
    SingleUse,
    /// Reused at least once since insertion.
    MultiUse,
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    segment: Segment,
    links: Links,
}

impl<K, V> Linked for Entry<K, V> {
    fn links(&self) -> &Links {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

/// Bounded segmented-LRU cache.
///
/// New entries join the single-use list; a `get` hit or an overwriting
/// `put` promotes the entry to the multi-use list. See the module docs for
/// the eviction rule.
///
/// # Type Parameters
///
/// - `K`: key type, `Clone + Eq + Hash` (one copy lives in the index, one
///   in the entry)
/// - `V`: value type
pub struct SlruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Key to arena-slot mapping.
    index: FxHashMap<K, SlotId>,
    /// Owns every live entry; both lists link through it.
    arena: SlotArena<Entry<K, V>>,
    single_use: RecencyList,
    multi_use: RecencyList,
    max_size: usize,
}

impl<K, V> SlruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a cache holding at most `max_size` entries.
    ///
    /// # Panics
    ///
    /// If `max_size` is zero; use [`try_new`](Self::try_new) to validate
    /// user-supplied capacities instead.
    pub fn new(max_size: usize) -> Self {
        match Self::try_new(max_size) {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }

    /// Creates a cache holding at most `max_size` entries, rejecting a
    /// zero capacity.
    ///
    /// # Example
    ///
    /// ```
    /// use sparsekit::policy::SlruCache;
    ///
    /// assert!(SlruCache::<u32, u32>::try_new(8).is_ok());
    /// assert!(SlruCache::<u32, u32>::try_new(0).is_err());
    /// ```
    pub fn try_new(max_size: usize) -> Result<Self, ConfigError> {
        if max_size == 0 {
            return Err(ConfigError::new("cache capacity must be greater than zero"));
        }
        Ok(Self {
            index: FxHashMap::with_capacity_and_hasher(max_size, Default::default()),
            arena: SlotArena::with_capacity(max_size),
            single_use: RecencyList::new(),
            multi_use: RecencyList::new(),
            max_size,
        })
    }

    /// Returns the number of cached entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the fixed capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Returns `true` if `key` is cached, without promoting it.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the number of entries on the single-use list.
    #[inline]
    pub fn single_use_len(&self) -> usize {
        self.single_use.len()
    }

    /// Returns the number of entries on the multi-use list.
    #[inline]
    pub fn multi_use_len(&self) -> usize {
        self.multi_use.len()
    }

    /// Inserts or overwrites the value for `key`.
    ///
    /// An overwrite counts as reuse: the existing entry keeps its slot but
    /// moves to the multi-use list. A new key at capacity first evicts one
    /// victim, then joins the single-use list.
    ///
    /// # Example
    ///
    /// ```
    /// use sparsekit::policy::SlruCache;
    ///
    /// let mut cache = SlruCache::new(4);
    /// cache.put("key", 1);
    /// assert_eq!(cache.single_use_len(), 1);
    ///
    /// cache.put("key", 2);
    /// assert_eq!(cache.multi_use_len(), 1);
    /// assert_eq!(cache.get(&"key"), Some(&2));
    /// ```
    pub fn put(&mut self, key: K, value: V) {
        if let Some(&id) = self.index.get(&key) {
            self.arena
                .get_mut(id)
                .expect("slru: index points at a vacant slot")
                .value = value;
            self.promote(id);
            return;
        }

        if self.index.len() == self.max_size {
            self.evict_one();
        }

        let id = self.arena.insert(Entry {
            key: key.clone(),
            value,
            segment: Segment::SingleUse,
            links: Links::new(),
        });
        self.index.insert(key, id);
        self.single_use.push_back(&mut self.arena, id);
        debug_assert!(self.index.len() <= self.max_size);
    }

    /// Returns the value for `key`, promoting the entry to the multi-use
    /// list on a hit. A miss mutates nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use sparsekit::policy::SlruCache;
    ///
    /// let mut cache = SlruCache::new(4);
    /// cache.put(1, "one");
    ///
    /// assert_eq!(cache.get(&1), Some(&"one"));
    /// assert_eq!(cache.multi_use_len(), 1);
    /// assert_eq!(cache.get(&2), None);
    /// ```
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.promote(id);
        Some(
            &self
                .arena
                .get(id)
                .expect("slru: promoted entry vanished")
                .value,
        )
    }

    /// Removes `key`, returning its value if it was cached.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.detach(id);
        let entry = self
            .arena
            .remove(id)
            .expect("slru: removed entry missing from arena");
        Some(entry.value)
    }

    /// Drops every entry and resets both lists.
    pub fn clear(&mut self) {
        self.index.clear();
        self.arena.clear();
        self.single_use.reset();
        self.multi_use.reset();
    }

    /// Unlinks `id` from the list its segment tag names.
    fn detach(&mut self, id: SlotId) -> Segment {
        let segment = self
            .arena
            .get(id)
            .expect("slru: index points at a vacant slot")
            .segment;
        match segment {
            Segment::SingleUse => self.single_use.detach(&mut self.arena, id),
            Segment::MultiUse => self.multi_use.detach(&mut self.arena, id),
        }
        segment
    }

    /// Moves `id` to the multi-use back (most-recent) position.
    fn promote(&mut self, id: SlotId) {
        self.detach(id);
        self.arena
            .get_mut(id)
            .expect("slru: promoted entry vanished")
            .segment = Segment::MultiUse;
        self.multi_use.push_back(&mut self.arena, id);
    }

    /// Evicts exactly one entry; the cache must be at capacity.
    ///
    /// The single-use front is taken while that segment holds at least
    /// `max_size / 4` entries; otherwise the multi-use LRU pays. An empty
    /// preferred list falls through to the other one.
    fn evict_one(&mut self) {
        let quota = self.max_size / 4;
        let id = if !self.single_use.is_empty() && self.single_use.len() >= quota {
            self.single_use.pop_front(&mut self.arena)
        } else if !self.multi_use.is_empty() {
            self.multi_use.pop_front(&mut self.arena)
        } else {
            self.single_use.pop_front(&mut self.arena)
        };
        let id = id.expect("slru: eviction requested on an empty cache");

        let entry = self
            .arena
            .remove(id)
            .expect("slru: evicted entry missing from arena");
        match self.index.remove(&entry.key) {
            Some(mapped) if mapped == id => {}
            _ => panic!("slru: cache index out of sync with recency lists"),
        }
    }

    /// Verifies the structural invariants, returning the first violation.
    ///
    /// Intended for tests and embedder diagnostics; a failure indicates a
    /// defect in this structure, not API misuse.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() > self.max_size {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.index.len(),
                self.max_size
            )));
        }
        if self.single_use.len() + self.multi_use.len() != self.index.len() {
            return Err(InvariantError::new(format!(
                "list lengths {} + {} do not match index size {}",
                self.single_use.len(),
                self.multi_use.len(),
                self.index.len()
            )));
        }
        if self.arena.len() != self.index.len() {
            return Err(InvariantError::new(format!(
                "arena holds {} entries but index has {}",
                self.arena.len(),
                self.index.len()
            )));
        }

        let mut seen = HashSet::new();
        for (list, segment, name) in [
            (&self.single_use, Segment::SingleUse, "single-use"),
            (&self.multi_use, Segment::MultiUse, "multi-use"),
        ] {
            let mut walked = 0usize;
            for id in list.iter_ids(&self.arena) {
                if !seen.insert(id) {
                    return Err(InvariantError::new(format!(
                        "{name} list revisits slot {}",
                        id.index()
                    )));
                }
                walked += 1;
                if walked > list.len() {
                    return Err(InvariantError::new(format!(
                        "{name} list walk exceeds its tracked length {}",
                        list.len()
                    )));
                }
                let entry = self.arena.get(id).ok_or_else(|| {
                    InvariantError::new(format!("{name} list references a vacant slot"))
                })?;
                if entry.segment != segment {
                    return Err(InvariantError::new(format!(
                        "{name} list holds an entry tagged {:?}",
                        entry.segment
                    )));
                }
                match self.index.get(&entry.key) {
                    Some(&mapped) if mapped == id => {}
                    _ => {
                        return Err(InvariantError::new(format!(
                            "{name} entry is not indexed back to its slot"
                        )))
                    }
                }
            }
            if walked != list.len() {
                return Err(InvariantError::new(format!(
                    "{name} list walk found {walked} entries, tracked {}",
                    list.len()
                )));
            }
        }

        Ok(())
    }
}

impl<K, V> Clone for SlruCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    /// Snapshot copy: an independent cache with the same capacity, entries,
    /// segment assignments, and recency order.
    fn clone(&self) -> Self {
        let mut copy = Self::try_new(self.max_size).expect("capacity already validated");
        for (source, segment) in [
            (&self.single_use, Segment::SingleUse),
            (&self.multi_use, Segment::MultiUse),
        ] {
            for id in source.iter_ids(&self.arena) {
                let entry = self
                    .arena
                    .get(id)
                    .expect("slru: list references a vacant slot");
                let new_id = copy.arena.insert(Entry {
                    key: entry.key.clone(),
                    value: entry.value.clone(),
                    segment,
                    links: Links::new(),
                });
                copy.index.insert(entry.key.clone(), new_id);
                match segment {
                    Segment::SingleUse => copy.single_use.push_back(&mut copy.arena, new_id),
                    Segment::MultiUse => copy.multi_use.push_back(&mut copy.arena, new_id),
                }
            }
        }
        copy
    }
}

impl<K, V> fmt::Debug for SlruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlruCache")
            .field("capacity", &self.max_size)
            .field("len", &self.index.len())
            .field("single_use_len", &self.single_use.len())
            .field("multi_use_len", &self.multi_use.len())
            .finish_non_exhaustive()
    }
}

impl<K, V> ReadOnlyCache<K, V> for SlruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.max_size
    }
}

impl<K, V> CoreCache<K, V> for SlruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            let entry = self
                .arena
                .get_mut(id)
                .expect("slru: index points at a vacant slot");
            let old = std::mem::replace(&mut entry.value, value);
            self.promote(id);
            return Some(old);
        }
        SlruCache::put(self, key, value);
        None
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        SlruCache::get(self, key)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.max_size
    }

    fn clear(&mut self) {
        SlruCache::clear(self);
    }
}

impl<K, V> MutableCache<K, V> for SlruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        SlruCache::remove(self, key)
    }
}
