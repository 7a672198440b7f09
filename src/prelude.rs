pub use crate::ds::{Linked, Links, RecencyList, SlotArena, SlotId, SparseArray, Values};
pub use crate::error::{ConfigError, FrozenError, InvariantError};
pub use crate::policy::SlruCache;
pub use crate::traits::{CoreCache, MutableCache, ReadOnlyCache};
