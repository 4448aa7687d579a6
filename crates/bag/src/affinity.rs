//! Per-thread affinity cache: the lock-free fast path for borrow/requite.
//!
//! Each thread keeps its own ordered list of weak back-references to items
//! it most recently requited. The list is private to its owning thread —
//! no synchronization is needed to read or mutate it — and entries are
//! `Weak`, never `Strong`, so the cache cannot keep an item alive past the
//! registry's own retention.
//!
//! Backed by the `thread_local` crate rather than `std::thread_local!`:
//! the cache's element type depends on the bag's generic item type `T`,
//! and a `std::thread_local!` static cannot close over an enclosing
//! generic parameter. `thread_local::ThreadLocal` is a regular struct
//! field, so each `Bag<T>` instance gets its own per-thread storage with
//! no risk of two bag instances colliding on the same slot.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::Weak;
use thread_local::ThreadLocal;

pub(crate) struct AffinityCache<T: Send + Sync> {
    capacity: usize,
    cells: ThreadLocal<RefCell<VecDeque<Weak<T>>>>,
}

impl<T: Send + Sync> AffinityCache<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cells: ThreadLocal::new(),
        }
    }

    fn cell(&self) -> &RefCell<VecDeque<Weak<T>>> {
        self.cells.get_or(|| RefCell::new(VecDeque::new()))
    }

    /// Pushes a weak back-reference onto the calling thread's cache,
    /// evicting the oldest entry if the cache is at capacity.
    pub(crate) fn push(&self, item: &std::sync::Arc<T>) {
        let cell = self.cell();
        let mut list = cell.borrow_mut();
        if list.len() >= self.capacity {
            list.pop_front();
        }
        list.push_back(std::sync::Arc::downgrade(item));
    }

    /// Walks the calling thread's cache from the most-recent end backward,
    /// popping each back-reference as it's examined (so stale entries
    /// never accumulate regardless of outcome), calling `try_borrow` on
    /// every resolvable item until one succeeds.
    pub(crate) fn take_with<F>(&self, mut try_borrow: F) -> Option<std::sync::Arc<T>>
    where
        F: FnMut(&std::sync::Arc<T>) -> bool,
    {
        let cell = self.cell();
        loop {
            let weak = cell.borrow_mut().pop_back()?;
            if let Some(item) = weak.upgrade() {
                if try_borrow(&item) {
                    return Some(item);
                }
            }
            // Resolution failure or CAS failure: discard and continue.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn push_then_take_round_trips() {
        let cache = AffinityCache::<u32>::new(4);
        let item = Arc::new(7u32);
        cache.push(&item);
        let got = cache.take_with(|_| true).unwrap();
        assert!(Arc::ptr_eq(&got, &item));
        assert!(cache.take_with(|_| true).is_none());
    }

    #[test]
    fn take_skips_entries_that_fail_the_predicate() {
        let cache = AffinityCache::<u32>::new(4);
        let a = Arc::new(1u32);
        let b = Arc::new(2u32);
        cache.push(&a);
        cache.push(&b);
        // Most-recent (b) is examined first; reject it, accept a.
        let got = cache.take_with(|i| **i == 1).unwrap();
        assert!(Arc::ptr_eq(&got, &a));
        assert!(cache.take_with(|_| true).is_none());
    }

    #[test]
    fn eviction_drops_the_oldest_entry() {
        let cache = AffinityCache::<u32>::new(1);
        let a = Arc::new(1u32);
        let b = Arc::new(2u32);
        cache.push(&a);
        cache.push(&b);
        let got = cache.take_with(|_| true).unwrap();
        assert!(Arc::ptr_eq(&got, &b));
        assert!(cache.take_with(|_| true).is_none());
    }
}
