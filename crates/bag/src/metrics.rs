//! In-process instrumentation for a [`crate::Bag`].
//!
//! These are plain atomic counters, not a reporting pipeline: exporting
//! them to a metrics backend is the host application's job.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live, thread-safe counters updated as the bag is used.
#[derive(Debug, Default)]
pub struct Metrics {
    pub(crate) borrows_total: AtomicU64,
    pub(crate) affinity_hits: AtomicU64,
    pub(crate) registry_scans: AtomicU64,
    pub(crate) steals: AtomicU64,
    pub(crate) parks: AtomicU64,
    pub(crate) timeouts: AtomicU64,
    pub(crate) adds: AtomicU64,
    pub(crate) removes: AtomicU64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            borrows_total: self.borrows_total.load(Ordering::Relaxed),
            affinity_hits: self.affinity_hits.load(Ordering::Relaxed),
            registry_scans: self.registry_scans.load(Ordering::Relaxed),
            steals: self.steals.load(Ordering::Relaxed),
            parks: self.parks.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            adds: self.adds.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of the bag's live counters, safe to log or hand to
/// a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total successful `borrow` calls (affinity hits + registry steals).
    pub borrows_total: u64,
    /// Borrows satisfied from the calling thread's affinity cache.
    pub affinity_hits: u64,
    /// Number of times the shared registry was scanned looking for an
    /// idle item.
    pub registry_scans: u64,
    /// Borrows satisfied by stealing an idle item from the shared
    /// registry (a registry scan that found something).
    pub steals: u64,
    /// Number of times a borrower parked on the wait station.
    pub parks: u64,
    /// Number of `borrow` calls that returned `None` after the timeout
    /// elapsed.
    pub timeouts: u64,
    /// Total `add` calls that succeeded.
    pub adds: u64,
    /// Total `remove` calls that succeeded.
    pub removes: u64,
}
