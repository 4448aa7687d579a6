//! The bag façade: coordinates the item state machine, the shared
//! registry, the thread-affinity cache, and the sequence-gated wait
//! station behind the public `borrow`/`requite`/`add`/`remove`/`reserve`/
//! `unreserve` protocol.

use crate::affinity::AffinityCache;
use crate::config::BagConfig;
use crate::error::BagError;
use crate::invariants::debug_assert_removed_from_registry;
use crate::item::{BagEntry, ItemState};
use crate::listener::BagStateListener;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::registry::Registry;
use crate::wait::{AcquireOutcome, WaitStation};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A concurrent bag of reusable, stateful items.
///
/// See the crate-level documentation for the full protocol. `T` is the
/// caller-supplied item type; it must embed exactly one state cell via
/// [`BagEntry`] (use [`crate::PooledEntry`] if you don't need a custom
/// layout).
pub struct Bag<T: BagEntry> {
    registry: Registry<T>,
    affinity: AffinityCache<T>,
    wait_station: WaitStation,
    listener: Option<Box<dyn BagStateListener>>,
    closed: AtomicBool,
    metrics: Metrics,
    metrics_enabled: bool,
}

impl<T: BagEntry + 'static> Bag<T> {
    /// Creates an empty bag with no attached listener.
    pub fn new(config: BagConfig) -> Self {
        Self::with_listener(config, None)
    }

    /// Creates an empty bag that invokes `listener.add_bag_item()` from
    /// `borrow` whenever a shared-registry scan comes up empty.
    pub fn with_listener(config: BagConfig, listener: Option<Box<dyn BagStateListener>>) -> Self {
        Self {
            registry: Registry::new(),
            affinity: AffinityCache::new(config.affinity_cache_capacity),
            wait_station: WaitStation::new(),
            listener,
            closed: AtomicBool::new(false),
            metrics: Metrics::new(),
            metrics_enabled: config.enable_metrics,
        }
    }

    /// Increments `counter` unless [`BagConfig::enable_metrics`] was left
    /// off, in which case counting is skipped entirely rather than paying
    /// for atomic increments nobody reads.
    fn bump(&self, counter: &AtomicU64) {
        if self.metrics_enabled {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Borrows an idle item, or `Ok(None)` if none became available within
    /// `timeout`. In short: affinity cache, then shared scan gated by a
    /// sequence witness, then park until the sequence advances or the
    /// timeout elapses.
    pub fn borrow(&self, timeout: Duration) -> Result<Option<Arc<T>>, BagError> {
        let deadline = Instant::now() + timeout;

        // Step 1: affinity fast path.
        if let Some(item) = self
            .affinity
            .take_with(|item| item.try_transition(ItemState::NotInUse, ItemState::InUse))
        {
            self.bump(&self.metrics.borrows_total);
            self.bump(&self.metrics.affinity_hits);
            tracing::trace!("borrow: affinity cache hit");
            return Ok(Some(item));
        }

        loop {
            // Step 2: shared scan with sequence witness.
            let witness = self.wait_station.witness();
            self.bump(&self.metrics.registry_scans);
            if let Some(item) = self.registry.scan_borrow() {
                self.bump(&self.metrics.borrows_total);
                self.bump(&self.metrics.steals);
                tracing::trace!("borrow: stole an idle item from the registry");
                return Ok(Some(item));
            }

            // Step 3: advisory demand signal.
            if let Some(listener) = &self.listener {
                listener.add_bag_item();
            }

            // A concurrent publisher may have raced the scan above; if the
            // sequence already moved on, re-scan without waiting.
            if self.wait_station.witness() != witness {
                continue;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.bump(&self.metrics.timeouts);
                return Ok(None);
            }

            // Step 4: park.
            self.bump(&self.metrics.parks);
            tracing::trace!(timeout_ms = remaining.as_millis() as u64, "borrow: parking");
            match self.wait_station.acquire(witness, remaining) {
                AcquireOutcome::Signaled => {}
                AcquireOutcome::TimedOut => {
                    self.bump(&self.metrics.timeouts);
                    return Ok(None);
                }
                AcquireOutcome::Interrupted => {
                    tracing::warn!("borrow: interrupted while parked");
                    return Err(BagError::Interrupted);
                }
            }
        }
    }

    /// Returns a borrowed item to the bag. Pushes it onto the calling
    /// thread's affinity cache and wakes one parked borrower.
    pub fn requite(&self, item: &Arc<T>) -> Result<(), BagError> {
        if !item.try_transition(ItemState::InUse, ItemState::NotInUse) {
            tracing::warn!("requite: item was not borrowed");
            return Err(BagError::NotBorrowed);
        }
        self.affinity.push(item);
        self.wait_station.advance();
        Ok(())
    }

    /// Adds `item` to the registry. Fails if the bag is closed. The item's
    /// state cell is left untouched (normally `NOT_IN_USE`).
    pub fn add(&self, item: Arc<T>) -> Result<(), BagError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BagError::Closed);
        }
        self.registry.push(item);
        self.wait_station.advance();
        self.bump(&self.metrics.adds);
        tracing::debug!("item added");
        Ok(())
    }

    /// Removes `item`, which must currently be held exclusively by the
    /// caller (`IN_USE` from a borrow, or `RESERVED`).
    pub fn remove(&self, item: &Arc<T>) -> Result<(), BagError> {
        let removed = if item.try_transition(ItemState::InUse, ItemState::Removed) {
            true
        } else {
            item.try_transition(ItemState::Reserved, ItemState::Removed)
        };
        if !removed {
            tracing::warn!("remove: item was not borrowed or reserved");
            return Err(BagError::NotHeld);
        }

        let found = self.registry.remove(item);
        debug_assert_removed_from_registry!(found);
        if !found {
            return Err(BagError::Missing);
        }
        self.bump(&self.metrics.removes);
        tracing::debug!("item removed");
        Ok(())
    }

    /// Administratively holds an idle item. Never fails; returns whether
    /// the `NOT_IN_USE -> RESERVED` transition succeeded.
    pub fn reserve(&self, item: &Arc<T>) -> bool {
        item.try_transition(ItemState::NotInUse, ItemState::Reserved)
    }

    /// Releases a reservation. The sequence is advanced *before* the CAS
    /// so that a borrower which captured its witness after the advance but
    /// before the state change still observes the new `NOT_IN_USE` state on
    /// its next scan rather than missing it.
    pub fn unreserve(&self, item: &Arc<T>) -> Result<(), BagError> {
        self.wait_station.advance();
        if !item.try_transition(ItemState::Reserved, ItemState::NotInUse) {
            tracing::warn!("unreserve: item was not reserved");
            return Err(BagError::NotReserved);
        }
        Ok(())
    }

    /// A best-effort snapshot of items currently in `state`. Only
    /// `NotInUse` and `InUse` are valid; any other state yields an empty
    /// list.
    pub fn values(&self, state: ItemState) -> Vec<Arc<T>> {
        match state {
            ItemState::NotInUse | ItemState::InUse => self.registry.snapshot(state),
            ItemState::Reserved | ItemState::Removed => Vec::new(),
        }
    }

    /// Total number of items the registry currently tracks.
    pub fn size(&self) -> usize {
        self.registry.len()
    }

    /// Alias for [`Self::size`].
    pub fn len(&self) -> usize {
        self.size()
    }

    /// Whether the registry currently tracks zero items.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Current count of items in `state`.
    pub fn get_count(&self, state: ItemState) -> usize {
        self.registry.count(state)
    }

    /// Current number of threads parked in the wait station.
    pub fn get_pending_queue(&self) -> usize {
        self.wait_station.pending_count()
    }

    /// A snapshot of the bag's in-process counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Rejects further `add` calls. Does not affect in-flight borrows or
    /// requites.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        tracing::info!("bag closed");
    }

    /// Whether [`Self::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Releases every thread currently parked in `borrow` with
    /// [`BagError::Interrupted`], and causes any future `borrow` call that
    /// would otherwise park to return the same immediately. There is no
    /// per-thread cancellation in this API (see `crate::wait` for why);
    /// this is the bag-wide equivalent, intended for pool shutdown.
    pub fn interrupt_waiters(&self) {
        self.wait_station.interrupt_all();
    }
}

impl<T: BagEntry + std::fmt::Debug + 'static> Bag<T> {
    /// One diagnostic line per item, current state first. Races with
    /// concurrent transitions; informational only.
    pub fn dump_state(&self) -> String {
        self.registry.dump_state()
    }
}
