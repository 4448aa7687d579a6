//! Debug assertion macros for the bag's state and registry invariants.
//!
//! These macros provide runtime checks for the invariants. They are only
//! active in debug builds (`#[cfg(debug_assertions)]`), so there is zero
//! overhead in release builds.

// =============================================================================
// I1: Registry never holds a REMOVED item
// =============================================================================

/// Assert that an item surfaced by a registry scan/snapshot is never in the
/// `REMOVED` state — a successfully removed item must have left the
/// registry in the same critical section that transitioned its cell.
///
/// Used in: `Registry::scan_borrow`, `Registry::snapshot`.
macro_rules! debug_assert_not_removed {
    ($state:expr) => {
        debug_assert!(
            !matches!($state, $crate::item::ItemState::Removed),
            "I1 violated: registry holds an item in the REMOVED state"
        )
    };
}

// =============================================================================
// I4: No item present in the registry after a successful remove
// =============================================================================

/// Assert that `remove` actually found the item it just CAS'd to REMOVED.
///
/// Used in: `Bag::remove`, after `Registry::remove` returns.
macro_rules! debug_assert_removed_from_registry {
    ($found:expr) => {
        debug_assert!(
            $found,
            "I4 violated: item transitioned to REMOVED but was absent from the registry"
        )
    };
}

// =============================================================================
// Sequence counter: monotonic progress
// =============================================================================

/// Assert that the wait station's sequence counter never decreases.
///
/// Used in: `WaitStation::advance`.
macro_rules! debug_assert_sequence_monotonic {
    ($old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "sequence counter decreased from {} to {}",
            $old,
            $new
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_not_removed;
pub(crate) use debug_assert_removed_from_registry;
pub(crate) use debug_assert_sequence_monotonic;
