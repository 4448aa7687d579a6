//! The item state cell and the `BagEntry` contract.
//!
//! The whole concurrency protocol turns on compare-and-set transitions of a
//! single atomic integer embedded in each item. See `crate::bag` for the
//! legal transition graph.

use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicI32, Ordering};

/// Logical state of an item tracked by a [`crate::Bag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ItemState {
    /// Permanently withdrawn. Terminal: no outgoing transition.
    Removed = -1,
    /// Administratively held; not borrowable, not removed.
    Reserved = -2,
    /// Idle, eligible to be borrowed.
    NotInUse = 0,
    /// Checked out to some borrower.
    InUse = 1,
}

impl ItemState {
    fn from_raw(raw: i32) -> Self {
        match raw {
            -1 => Self::Removed,
            -2 => Self::Reserved,
            0 => Self::NotInUse,
            1 => Self::InUse,
            other => panic!("item state cell holds out-of-protocol value {other}"),
        }
    }
}

/// The contract a bag item must satisfy: exactly one atomic state cell
/// accessible to the bag's protocol. Items may carry arbitrary caller
/// payload beyond that cell; the bag never inspects it.
pub trait BagEntry: Send + Sync {
    /// Returns a reference to this item's state cell.
    fn state_cell(&self) -> &AtomicI32;

    /// Reads the current state. Best-effort: another thread may transition
    /// the cell the instant after this returns.
    #[inline]
    fn state(&self) -> ItemState {
        ItemState::from_raw(self.state_cell().load(Ordering::Acquire))
    }

    /// Attempts the `from -> to` transition. Returns `true` on success.
    #[inline]
    fn try_transition(&self, from: ItemState, to: ItemState) -> bool {
        self.state_cell()
            .compare_exchange(from as i32, to as i32, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// A ready-made item wrapper for callers who don't need a custom layout.
///
/// Pads the state cell to its own cache line so that CAS traffic on one
/// pooled entry's state doesn't bounce the cache line backing a
/// neighboring entry's payload (relevant once many entries sit in the
/// same `Vec` inside the registry).
#[derive(Debug)]
pub struct PooledEntry<T> {
    state: CachePadded<AtomicI32>,
    payload: T,
}

impl<T> PooledEntry<T> {
    /// Wraps `payload` in a fresh entry, initialized `NOT_IN_USE` — items
    /// are created externally in that state and handed to the bag via
    /// `add`.
    pub fn new(payload: T) -> Self {
        Self {
            state: CachePadded::new(AtomicI32::new(ItemState::NotInUse as i32)),
            payload,
        }
    }

    /// Borrows the wrapped payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }
}

impl<T: Send + Sync> BagEntry for PooledEntry<T> {
    fn state_cell(&self) -> &AtomicI32 {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_starts_not_in_use() {
        let entry = PooledEntry::new(42u64);
        assert_eq!(entry.state(), ItemState::NotInUse);
        assert_eq!(*entry.payload(), 42);
    }

    #[test]
    fn try_transition_respects_current_state() {
        let entry = PooledEntry::new(());
        assert!(entry.try_transition(ItemState::NotInUse, ItemState::InUse));
        assert_eq!(entry.state(), ItemState::InUse);
        // Wrong `from` state: fails, state unchanged.
        assert!(!entry.try_transition(ItemState::NotInUse, ItemState::Removed));
        assert_eq!(entry.state(), ItemState::InUse);
    }
}
