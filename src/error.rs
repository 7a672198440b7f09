//! Error types for the sparsekit library.
//!
//! ## Key Components
//!
//! - [`FrozenError`]: Returned when a mutating operation is called on a
//!   frozen [`SparseArray`](crate::ds::SparseArray).
//! - [`ConfigError`]: Returned when construction parameters are invalid
//!   (e.g. zero cache capacity).
//! - [`InvariantError`]: Returned by diagnostic `check_invariants` methods
//!   when internal data-structure invariants are violated.
//!
//! Invariant breaches detected on hot paths (unlinking a detached entry,
//! a probe loop that never terminates) are programming defects, not user
//! conditions, and panic instead of surfacing as one of these types.
//!
//! ## Example Usage
//!
//! ```
//! use sparsekit::ds::SparseArray;
//! use sparsekit::error::FrozenError;
//!
//! let mut table: SparseArray<i32> = SparseArray::new();
//! table.put(1, 10).unwrap();
//! table.freeze();
//!
//! // Mutation after freeze is a recoverable, named error.
//! let err: FrozenError = table.put(2, 20).unwrap_err();
//! assert!(err.to_string().contains("frozen"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// FrozenError
// ---------------------------------------------------------------------------

/// Error returned when a mutating operation is attempted on a frozen table.
///
/// Once [`SparseArray::freeze`](crate::ds::SparseArray::freeze) has been
/// called, `put`, `remove`, and `clear` return this error and leave the
/// table untouched. Reads, iteration, equality, and snapshots stay
/// available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenError(String);

impl FrozenError {
    /// Creates a new `FrozenError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrozenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for FrozenError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when construction parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`SlruCache::try_new`](crate::policy::SlruCache::try_new). Carries a
/// human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use sparsekit::policy::SlruCache;
///
/// let err = SlruCache::<u64, u64>::try_new(0).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal data-structure invariants are violated.
///
/// Produced by the `check_invariants` diagnostic methods on
/// [`SlruCache`](crate::policy::SlruCache) and
/// [`SparseArray`](crate::ds::SparseArray). A failure indicates a defect in
/// the structure itself, never a misuse of the public API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
