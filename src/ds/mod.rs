pub mod recency_list;
pub mod slot_arena;
pub mod sparse_array;

pub use recency_list::{Linked, Links, RecencyList};
pub use slot_arena::{SlotArena, SlotId};
pub use sparse_array::{SparseArray, Values};
