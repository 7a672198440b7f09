//! Intrusive recency queue linking entries stored in an external [`SlotArena`].
//!
//! Entries embed a [`Links`] record (exposed through the [`Linked`] trait) and
//! the list itself holds only head/tail/len bookkeeping, so several lists can
//! share one arena and moving an entry between lists never changes its
//! `SlotId`.
//!
//! ```text
//!   front ─► [id_4] ◄──► [id_1] ◄──► [id_7] ◄─ back
//!          least-recent              most-recent
//! ```
//!
//! [`push_back`](RecencyList::push_back) appends as most-recent;
//! [`pop_front`](RecencyList::pop_front) yields the least-recent entry.
//! Appending an already-attached entry or detaching a detached one is a
//! programming defect in the caller and panics; those conditions are
//! integrity failures, never recoverable results.

use crate::ds::slot_arena::{SlotArena, SlotId};

/// Intrusive link record embedded in every list-managed entry.
#[derive(Debug, Clone, Copy)]
pub struct Links {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    attached: bool,
}

impl Links {
    /// Creates a detached link record.
    pub const fn new() -> Self {
        Self {
            prev: None,
            next: None,
            attached: false,
        }
    }

    /// Returns `true` while the owning entry sits in some list.
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl Default for Links {
    fn default() -> Self {
        Self::new()
    }
}

/// Access to the embedded [`Links`] of an arena entry.
pub trait Linked {
    fn links(&self) -> &Links;
    fn links_mut(&mut self) -> &mut Links;
}

/// Recency queue bookkeeping over entries held in an external arena.
#[derive(Debug, Default)]
pub struct RecencyList {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl RecencyList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Returns the number of attached entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no entry is attached.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the least-recent entry's id.
    pub fn front(&self) -> Option<SlotId> {
        self.head
    }

    /// Returns the most-recent entry's id.
    pub fn back(&self) -> Option<SlotId> {
        self.tail
    }

    /// Appends `id` as the most-recent entry.
    ///
    /// # Panics
    ///
    /// If `id` has no slot in `arena` or its entry is already attached.
    pub fn push_back<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        let old_tail = self.tail;
        {
            let entry = arena
                .get_mut(id)
                .expect("recency list: appending an id with no arena slot");
            let links = entry.links_mut();
            if links.attached {
                panic!("recency list: appending an entry that is already attached");
            }
            links.prev = old_tail;
            links.next = None;
            links.attached = true;
        }
        match old_tail {
            Some(tail) => {
                arena
                    .get_mut(tail)
                    .expect("recency list: tail id has no arena slot")
                    .links_mut()
                    .next = Some(id);
            }
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }

    /// Unlinks `id` from the list without touching its arena slot.
    ///
    /// # Panics
    ///
    /// If the list is empty, `id` has no slot in `arena`, or its entry is
    /// not attached.
    pub fn detach<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        if self.len == 0 {
            panic!("recency list: detach from an empty list");
        }
        let (prev, next) = {
            let entry = arena
                .get_mut(id)
                .expect("recency list: detaching an id with no arena slot");
            let links = entry.links_mut();
            if !links.attached {
                panic!("recency list: detaching an entry that is not attached");
            }
            let neighbors = (links.prev, links.next);
            links.prev = None;
            links.next = None;
            links.attached = false;
            neighbors
        };
        match prev {
            Some(prev_id) => {
                arena
                    .get_mut(prev_id)
                    .expect("recency list: prev id has no arena slot")
                    .links_mut()
                    .next = next;
            }
            None => self.head = next,
        }
        match next {
            Some(next_id) => {
                arena
                    .get_mut(next_id)
                    .expect("recency list: next id has no arena slot")
                    .links_mut()
                    .prev = prev;
            }
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Detaches and returns the least-recent entry's id.
    pub fn pop_front<T: Linked>(&mut self, arena: &mut SlotArena<T>) -> Option<SlotId> {
        let id = self.head?;
        self.detach(arena, id);
        Some(id)
    }

    /// Resets bookkeeping to the empty state without touching arena entries.
    ///
    /// The owner is expected to discard the entries (or re-link them) itself;
    /// stale `Links` in a cleared arena are never observed again.
    pub fn reset(&mut self) {
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates entry ids from least-recent to most-recent.
    pub fn iter_ids<'a, T: Linked>(&self, arena: &'a SlotArena<T>) -> IterIds<'a, T> {
        IterIds {
            arena,
            current: self.head,
        }
    }
}

/// Iterator over attached entry ids, front to back.
pub struct IterIds<'a, T> {
    arena: &'a SlotArena<T>,
    current: Option<SlotId>,
}

impl<T: Linked> Iterator for IterIds<'_, T> {
    type Item = SlotId;

    fn next(&mut self) -> Option<SlotId> {
        let id = self.current?;
        self.current = self.arena.get(id).and_then(|entry| entry.links().next);
        Some(id)
    }
}
