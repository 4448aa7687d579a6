//! The shared registry: every item the bag currently knows about,
//! regardless of state.
//!
//! # Synchronization strategy
//!
//! The registry is append-mostly: `add` and `remove` are rare relative to
//! `borrow`'s scans. It is backed by a `RwLock<Vec<Arc<T>>>` rather than a
//! lock-free structure — readers (scans, snapshots, counts) take a shared
//! read lock and never block each other; writers (`add`, `remove`) take the
//! exclusive write lock and are serialized against each other and against
//! readers for the duration of a `Vec` mutation: two readers never wait on
//! each other, and a writer's critical section is a single
//! `Vec::push`/`swap_remove`, bounded and short.
//!
//! Item state transitions themselves never take this lock: they are single
//! CAS operations on the item's own cell (`crate::item`), independent of
//! registry membership.

use crate::invariants::debug_assert_not_removed;
use crate::item::{BagEntry, ItemState};
use std::fmt::Write as _;
use std::sync::{Arc, RwLock};

pub(crate) struct Registry<T> {
    items: RwLock<Vec<Arc<T>>>,
}

impl<T: BagEntry> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    /// Appends `item` to the registry. No state-cell transition is
    /// performed; the item is added in whatever state the caller
    /// initialized it.
    pub(crate) fn push(&self, item: Arc<T>) {
        self.items.write().unwrap().push(item);
    }

    /// Removes `item` from the registry by identity. Returns `true` if it
    /// was present. Order is not preserved (the bag is not a queue).
    pub(crate) fn remove(&self, item: &Arc<T>) -> bool {
        let mut items = self.items.write().unwrap();
        if let Some(idx) = items.iter().position(|i| Arc::ptr_eq(i, item)) {
            items.swap_remove(idx);
            true
        } else {
            false
        }
    }

    /// Scans the registry once for an idle item and attempts to borrow it.
    /// Returns the first item whose `NOT_IN_USE -> IN_USE` CAS succeeds.
    pub(crate) fn scan_borrow(&self) -> Option<Arc<T>> {
        let items = self.items.read().unwrap();
        for item in items.iter() {
            debug_assert_not_removed!(item.state());
            if item.try_transition(ItemState::NotInUse, ItemState::InUse) {
                return Some(Arc::clone(item));
            }
        }
        None
    }

    /// A best-effort snapshot of every item currently in `state`. Items may
    /// transition concurrently with this scan; the result is a moment-in-time
    /// view, not a linearizable one.
    pub(crate) fn snapshot(&self, state: ItemState) -> Vec<Arc<T>> {
        let items = self.items.read().unwrap();
        items
            .iter()
            .filter(|item| {
                let s = item.state();
                debug_assert_not_removed!(s);
                s == state
            })
            .map(Arc::clone)
            .collect()
    }

    /// Current count of items in `state`.
    pub(crate) fn count(&self, state: ItemState) -> usize {
        let items = self.items.read().unwrap();
        items.iter().filter(|item| item.state() == state).count()
    }

    /// Total number of items the registry currently tracks.
    pub(crate) fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }
}

impl<T: BagEntry + std::fmt::Debug> Registry<T> {
    /// One diagnostic line per item, current state first. Races with
    /// concurrent transitions; informational only.
    pub(crate) fn dump_state(&self) -> String {
        let items = self.items.read().unwrap();
        let mut out = String::new();
        for item in items.iter() {
            let _ = writeln!(out, "{:?}: {:?}", item.state(), item);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::PooledEntry;

    #[test]
    fn push_then_scan_borrows_it() {
        let registry = Registry::<PooledEntry<u32>>::new();
        registry.push(Arc::new(PooledEntry::new(1)));
        let item = registry.scan_borrow().expect("one idle item");
        assert_eq!(item.state(), ItemState::InUse);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_drops_it_from_the_registry() {
        let registry = Registry::<PooledEntry<u32>>::new();
        let item = Arc::new(PooledEntry::new(1));
        registry.push(Arc::clone(&item));
        assert!(registry.remove(&item));
        assert_eq!(registry.len(), 0);
        assert!(!registry.remove(&item));
    }

    #[test]
    fn scan_skips_items_already_in_use() {
        let registry = Registry::<PooledEntry<u32>>::new();
        let busy = Arc::new(PooledEntry::new(1));
        assert!(busy.try_transition(ItemState::NotInUse, ItemState::InUse));
        registry.push(Arc::clone(&busy));
        let idle = Arc::new(PooledEntry::new(2));
        registry.push(Arc::clone(&idle));

        let borrowed = registry.scan_borrow().expect("the idle one");
        assert!(Arc::ptr_eq(&borrowed, &idle));
    }
}
