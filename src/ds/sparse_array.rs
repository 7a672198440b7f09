//! Open-addressed Robin Hood table keyed by 32-bit integers.
//!
//! `SparseArray` trades the pointer-heavy layout of a chained hash map for
//! two flat slot arrays, giving predictable worst-case probe lengths and a
//! small, cache-friendly footprint. It is meant to be embedded where a
//! generic map is too slow or too memory-hungry (interpreters, storage
//! engines).
//!
//! ## Architecture
//!
//! ```text
//!   capacity C (power of two, >= 16)
//!
//!   hash_keys: [u64; C]        values: [Option<V>; C]
//!   ┌──────────────────────┐   ┌──────────┐
//!   │ tag << 32 | key bits │   │ Some(v)  │   occupied slot
//!   │ 0                    │   │ None     │   empty slot
//!   └──────────────────────┘   └──────────┘
//!
//!   home slot  = tag & (C - 1)
//!   probe dist = forward circular distance from home slot to stored slot
//! ```
//!
//! The packed word doubles as a 64-bit equality key: an exact word match is
//! an exact hash-and-key match. A zero tag is reserved for "empty", so the
//! mixer forces a zero hash to 1.
//!
//! ## Operations
//!
//! | Operation       | Time            | Notes                                |
//! |-----------------|-----------------|--------------------------------------|
//! | `put`           | O(1) amortized  | May double capacity (full rehash)    |
//! | `get`           | O(1) expected   | Early exit via probe-distance bound  |
//! | `remove`        | O(1) expected   | Backward shift, no tombstones        |
//! | `snapshot`      | O(n)            | Compacts capacity, clears freeze     |
//! | `keys`/`values` | O(capacity)     | Eager keys, lazy single-pass values  |
//!
//! Insertion follows the Robin Hood discipline: an incoming item that has
//! probed farther than a resident steals the resident's slot and the
//! resident continues probing. Deletion shifts the following cluster one
//! slot backward instead of leaving a tombstone, which keeps lookups
//! terminating early forever.
//!
//! ## Example
//!
//! ```
//! use sparsekit::ds::SparseArray;
//!
//! let mut table: SparseArray<&str> = SparseArray::new();
//! table.put(7, "seven").unwrap();
//! table.put(-3, "minus three").unwrap();
//!
//! assert_eq!(table.get(7), Some(&"seven"));
//! assert_eq!(table.get(99), None);
//! assert!(table.remove(7).unwrap());
//!
//! // A frozen table rejects mutation but stays readable.
//! table.freeze();
//! assert!(table.put(8, "eight").is_err());
//! assert_eq!(table.get(-3), Some(&"minus three"));
//! ```
//!
//! ## Thread Safety
//!
//! Not thread-safe; single writer, one reader at a time. Wrap in external
//! synchronization for shared use.
//!
//! ## References
//!
//! - Celis, "Robin Hood Hashing", 1986
//! - <http://codecapsule.com/2013/11/17/robin-hood-hashing-backward-shift-deletion/>

use std::fmt;
use std::iter::FusedIterator;

use crate::error::{FrozenError, InvariantError};

const MIN_CAPACITY: usize = 16;
const MAX_LOAD_FACTOR: f32 = 0.85;

/// Open-addressed Robin Hood table from `i32` keys to values.
///
/// Capacity is always a power of two of at least 16 and doubles whenever an
/// insertion would push the load factor past 0.85. [`freeze`](Self::freeze)
/// permanently ends the mutable lifecycle of an instance; a fresh mutable
/// instance is obtained with [`snapshot`](Self::snapshot).
pub struct SparseArray<V> {
    /// Packed hash tag (upper 32 bits, never zero when occupied) and raw
    /// key bits (lower 32). An all-zero word marks an empty slot.
    hash_keys: Box<[u64]>,
    values: Box<[Option<V>]>,
    size: usize,
    frozen: bool,
}

impl<V> SparseArray<V> {
    /// Creates an empty table with the minimum capacity of 16.
    pub fn new() -> Self {
        Self::with_pow2(MIN_CAPACITY)
    }

    /// Creates an empty table sized for `capacity` entries, rounded up to a
    /// power of two of at least 16.
    ///
    /// # Example
    ///
    /// ```
    /// use sparsekit::ds::SparseArray;
    ///
    /// let table: SparseArray<u8> = SparseArray::with_capacity(129);
    /// assert_eq!(table.capacity(), 256);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_pow2(pow2_capacity(capacity))
    }

    fn with_pow2(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two() && capacity >= MIN_CAPACITY);
        Self {
            hash_keys: vec![0u64; capacity].into_boxed_slice(),
            values: empty_slots(capacity),
            size: 0,
            frozen: false,
        }
    }

    /// Builds a mutable copy of this table sized for its current contents.
    ///
    /// The copy's capacity holds `len()` entries at or below the maximum
    /// load factor (doubling once more when the compact size would sit at
    /// the boundary) and its frozen flag is cleared: snapshotting is the
    /// only way to regain mutability from a frozen instance.
    ///
    /// # Example
    ///
    /// ```
    /// use sparsekit::ds::SparseArray;
    ///
    /// let mut source: SparseArray<i32> = SparseArray::new();
    /// source.put(1, 10).unwrap();
    /// source.freeze();
    ///
    /// let mut copy = source.snapshot();
    /// copy.put(2, 20).unwrap();
    /// assert_eq!(copy.len(), 2);
    /// assert_eq!(source.len(), 1);
    /// ```
    pub fn snapshot(&self) -> Self
    where
        V: Clone,
    {
        let mut capacity = pow2_capacity(self.size);
        if self.size as f32 / capacity as f32 >= MAX_LOAD_FACTOR {
            capacity *= 2;
        }
        let mut copy = Self::with_pow2(capacity);
        let mut found = 0;
        for (i, &word) in self.hash_keys.iter().enumerate() {
            if found == self.size {
                break;
            }
            if (word >> 32) != 0 {
                let value = self.values[i]
                    .as_ref()
                    .expect("sparse array: occupied word over an absent value slot")
                    .clone();
                copy.insert_packed(word, value);
                found += 1;
            }
        }
        copy
    }

    /// Returns the number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the table holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the current slot-array capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.hash_keys.len()
    }

    /// Returns `true` once [`freeze`](Self::freeze) has been called.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Permanently ends this instance's mutable lifecycle. Idempotent.
    ///
    /// Reads, iteration, equality, and [`snapshot`](Self::snapshot) remain
    /// available; `put`, `remove`, and `clear` return [`FrozenError`].
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: i32) -> bool {
        self.find(pack_key(key)).is_some()
    }

    /// Returns the value stored for `key`, if any.
    ///
    /// Absence is a normal outcome, not an error: the probe stops as soon
    /// as an empty slot or a resident closer to its home than the scan
    /// offset proves the key cannot be stored further along.
    pub fn get(&self, key: i32) -> Option<&V> {
        let index = self.find(pack_key(key))?;
        Some(
            self.values[index]
                .as_ref()
                .expect("sparse array: occupied word over an absent value slot"),
        )
    }

    /// Returns the value stored for `key`, or `default` if absent.
    pub fn get_or<'a>(&'a self, key: i32, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// Inserts or overwrites the value for `key`.
    ///
    /// Capacity doubles (with a full rehash) before any insertion that
    /// would push the load factor past 0.85, so `len() <= 0.85 * capacity()`
    /// holds after every mutation.
    ///
    /// # Errors
    ///
    /// [`FrozenError`] if the table is frozen; the table is unchanged.
    pub fn put(&mut self, key: i32, value: V) -> Result<(), FrozenError> {
        if self.frozen {
            return Err(FrozenError::new("put on a frozen SparseArray"));
        }
        if (self.size + 1) as f32 / self.capacity() as f32 > MAX_LOAD_FACTOR {
            self.resize(self.capacity() * 2);
        }
        self.insert_packed(pack_key(key), value);
        Ok(())
    }

    /// Removes `key`, returning whether it was present.
    ///
    /// Uses backward-shift deletion: the cluster following the vacated slot
    /// moves one position back until an empty slot or a resident already in
    /// its home slot, so no tombstone is ever left behind.
    ///
    /// # Errors
    ///
    /// [`FrozenError`] if the table is frozen; the table is unchanged.
    pub fn remove(&mut self, key: i32) -> Result<bool, FrozenError> {
        if self.frozen {
            return Err(FrozenError::new("remove on a frozen SparseArray"));
        }
        let index = match self.find(pack_key(key)) {
            Some(index) => index,
            None => return Ok(false),
        };

        let mask = self.mask();
        for i in 0..self.capacity() {
            let curr = (index + i) & mask;
            let next = (curr + 1) & mask;

            let next_word = self.hash_keys[next];
            let next_tag = (next_word >> 32) as u32;
            if next_tag == 0 || self.dist_to_home(next_tag, next) == 0 {
                self.hash_keys[curr] = 0;
                self.values[curr] = None;
                self.size -= 1;
                return Ok(true);
            }

            self.hash_keys[curr] = next_word;
            self.values[curr] = self.values[next].take();
        }

        panic!("sparse array: backward shift traversed a full cycle");
    }

    /// Removes every entry, keeping the current capacity.
    ///
    /// # Errors
    ///
    /// [`FrozenError`] if the table is frozen; the table is unchanged.
    pub fn clear(&mut self) -> Result<(), FrozenError> {
        if self.frozen {
            return Err(FrozenError::new("clear on a frozen SparseArray"));
        }
        self.hash_keys.fill(0);
        for slot in self.values.iter_mut() {
            *slot = None;
        }
        self.size = 0;
        Ok(())
    }

    /// Returns every stored key, eagerly, in slot order.
    pub fn keys(&self) -> Vec<i32> {
        let mut keys = Vec::with_capacity(self.size);
        for &word in self.hash_keys.iter() {
            if keys.len() == self.size {
                break;
            }
            if (word >> 32) != 0 {
                keys.push(word as u32 as i32);
            }
        }
        keys
    }

    /// Returns a lazy, single-pass iterator over stored values in slot
    /// order. Call again for another pass.
    pub fn values(&self) -> Values<'_, V> {
        Values {
            slots: self.values.iter(),
            remaining: self.size,
        }
    }

    /// Verifies the structural invariants, returning the first violation.
    ///
    /// Intended for tests and embedder diagnostics; a failure indicates a
    /// defect in this structure, not API misuse.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let capacity = self.capacity();
        if !capacity.is_power_of_two() || capacity < MIN_CAPACITY {
            return Err(InvariantError::new(format!(
                "capacity {capacity} is not a power of two >= {MIN_CAPACITY}"
            )));
        }
        if self.size as f32 / capacity as f32 > MAX_LOAD_FACTOR {
            return Err(InvariantError::new(format!(
                "load factor {}/{capacity} exceeds {MAX_LOAD_FACTOR}",
                self.size
            )));
        }
        if self.values.len() != capacity {
            return Err(InvariantError::new("slot arrays differ in length"));
        }

        let mut occupied = 0;
        for (i, &word) in self.hash_keys.iter().enumerate() {
            if (word >> 32) == 0 {
                if word != 0 {
                    return Err(InvariantError::new(format!(
                        "slot {i} has key bits under a zero tag"
                    )));
                }
                if self.values[i].is_some() {
                    return Err(InvariantError::new(format!(
                        "empty slot {i} holds a value"
                    )));
                }
            } else {
                if self.values[i].is_none() {
                    return Err(InvariantError::new(format!(
                        "occupied slot {i} holds no value"
                    )));
                }
                occupied += 1;
            }
        }
        if occupied != self.size {
            return Err(InvariantError::new(format!(
                "{occupied} occupied slots but size is {}",
                self.size
            )));
        }

        // Robin Hood ordering: probe distance may rise by at most one per
        // slot and must restart at zero after an empty slot.
        for i in 0..capacity {
            let tag = (self.hash_keys[i] >> 32) as u32;
            if tag == 0 {
                continue;
            }
            let dist = self.dist_to_home(tag, i);
            if dist == 0 {
                continue;
            }
            let prev = (i + capacity - 1) & self.mask();
            let prev_tag = (self.hash_keys[prev] >> 32) as u32;
            if prev_tag == 0 {
                return Err(InvariantError::new(format!(
                    "slot {i} at probe distance {dist} follows an empty slot"
                )));
            }
            let prev_dist = self.dist_to_home(prev_tag, prev);
            if dist > prev_dist + 1 {
                return Err(InvariantError::new(format!(
                    "probe distance jumps from {prev_dist} to {dist} at slot {i}"
                )));
            }
        }

        Ok(())
    }

    #[inline]
    fn mask(&self) -> usize {
        self.capacity() - 1
    }

    /// Forward circular distance from `tag`'s home slot to `stored`.
    #[inline]
    fn dist_to_home(&self, tag: u32, stored: usize) -> usize {
        let home = (tag as usize) & self.mask();
        if home <= stored {
            stored - home
        } else {
            stored + (self.capacity() - home)
        }
    }

    /// Locates the slot holding `hash_key`, if present.
    fn find(&self, hash_key: u64) -> Option<usize> {
        if self.size == 0 {
            return None;
        }
        let mask = self.mask();
        let home = ((hash_key >> 32) as usize) & mask;
        for i in 0..self.capacity() {
            let index = (home + i) & mask;
            let word = self.hash_keys[index];
            if word == hash_key {
                return Some(index);
            }
            let tag = (word >> 32) as u32;
            if tag == 0 {
                return None;
            }
            // A resident closer to its home than our scan offset proves the
            // key cannot be stored any further along.
            if self.dist_to_home(tag, index) < i {
                return None;
            }
        }
        None
    }

    /// Robin Hood insertion of an already-packed word.
    ///
    /// The probe counter tracks the *current* item's displacement; after a
    /// swap it restarts at the displaced resident's former distance.
    fn insert_packed(&mut self, mut hash_key: u64, mut value: V) {
        let mask = self.mask();
        let home = ((hash_key >> 32) as usize) & mask;
        let mut probe = 0usize;

        for i in 0..self.capacity() {
            let index = (home + i) & mask;
            let word = self.hash_keys[index];
            let tag = (word >> 32) as u32;

            if tag == 0 {
                self.hash_keys[index] = hash_key;
                self.values[index] = Some(value);
                self.size += 1;
                return;
            }

            if word == hash_key {
                self.values[index] = Some(value);
                return;
            }

            let resident = self.dist_to_home(tag, index);
            if probe > resident {
                probe = resident;
                self.hash_keys[index] = hash_key;
                hash_key = word;
                value = match self.values[index].replace(value) {
                    Some(displaced) => displaced,
                    None => panic!("sparse array: occupied word over an absent value slot"),
                };
            }

            probe += 1;
        }

        panic!("sparse array: probe sequence exhausted a full cycle");
    }

    /// Rebuilds the slot arrays at `new_capacity`, reinserting every
    /// occupied slot in scan order.
    fn resize(&mut self, new_capacity: usize) {
        if new_capacity < self.size {
            panic!(
                "sparse array: resize capacity {new_capacity} below current size {}",
                self.size
            );
        }
        debug_assert!(new_capacity.is_power_of_two() && new_capacity >= MIN_CAPACITY);

        let old_size = self.size;
        let old_hash_keys =
            std::mem::replace(&mut self.hash_keys, vec![0u64; new_capacity].into_boxed_slice());
        let mut old_values = std::mem::replace(&mut self.values, empty_slots(new_capacity));
        self.size = 0;

        let mut found = 0;
        for (&word, slot) in old_hash_keys.iter().zip(old_values.iter_mut()) {
            if found == old_size {
                break;
            }
            if (word >> 32) != 0 {
                let value = slot
                    .take()
                    .expect("sparse array: occupied word over an absent value slot");
                self.insert_packed(word, value);
                found += 1;
            }
        }
    }
}

impl<V> Default for SparseArray<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PartialEq> PartialEq for SparseArray<V> {
    /// Structural equality: equal sizes and key-wise equal values. Slot
    /// layout, capacity, and frozen state are irrelevant.
    fn eq(&self, other: &Self) -> bool {
        if self.size != other.size {
            return false;
        }
        let mut found = 0;
        for (i, &word) in self.hash_keys.iter().enumerate() {
            if found == self.size {
                break;
            }
            if (word >> 32) != 0 {
                found += 1;
                let mine = self.values[i]
                    .as_ref()
                    .expect("sparse array: occupied word over an absent value slot");
                match other.get(word as u32 as i32) {
                    Some(theirs) if mine == theirs => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

impl<V: Eq> Eq for SparseArray<V> {}

impl<V> fmt::Debug for SparseArray<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseArray")
            .field("len", &self.size)
            .field("capacity", &self.capacity())
            .field("frozen", &self.frozen)
            .finish_non_exhaustive()
    }
}

/// Lazy iterator over stored values in slot order.
///
/// Single pass and non-restartable; obtain a fresh one from
/// [`SparseArray::values`].
pub struct Values<'a, V> {
    slots: std::slice::Iter<'a, Option<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        if self.remaining == 0 {
            return None;
        }
        for slot in self.slots.by_ref() {
            if let Some(value) = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}

impl<V> FusedIterator for Values<'_, V> {}

fn empty_slots<V>(capacity: usize) -> Box<[Option<V>]> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}

/// Bit-mixer spreading entropy across the low bits of the key.
#[inline]
fn smear(key: i32) -> u32 {
    let mut h = key as u32;
    h ^= (h >> 20) ^ (h >> 12);
    h ^ (h >> 7) ^ (h >> 4)
}

/// Packs `(tag << 32) | key-bits`; a zero tag is forced to 1 because zero
/// marks an empty slot.
#[inline]
fn pack_key(key: i32) -> u64 {
    let tag = match smear(key) {
        0 => 1,
        tag => tag,
    };
    ((tag as u64) << 32) | u64::from(key as u32)
}

#[inline]
fn pow2_capacity(requested: usize) -> usize {
    requested.next_power_of_two().max(MIN_CAPACITY)
}
