//! Error types for bag operations.

use thiserror::Error;

/// Errors that can occur on a [`crate::Bag`].
///
/// Per the protocol, most of these are contract violations: the caller
/// attempted a transition the item's current state does not allow. They are
/// programming bugs and are never retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BagError {
    /// `requite` was called on an item that was not `IN_USE`.
    #[error("item was not borrowed, cannot requite")]
    NotBorrowed,

    /// `remove` was called on an item that was neither `IN_USE` nor
    /// `RESERVED` (the two states a caller may hold exclusively).
    #[error("item is not borrowed or reserved, cannot remove")]
    NotHeld,

    /// The item's state transitioned to `REMOVED` but it was not found in
    /// the shared registry. Indicates the registry and the item's state
    /// cell disagreed; surfaced rather than silently ignored.
    #[error("item does not exist in the registry")]
    Missing,

    /// `unreserve` was called on an item that was not `RESERVED`.
    #[error("item is not reserved, cannot unreserve")]
    NotReserved,

    /// `add` was called after [`crate::Bag::close`].
    #[error("bag is closed")]
    Closed,

    /// The calling thread was asked to stop waiting while parked in
    /// `borrow`. See [`crate::Bag::interrupt_waiters`].
    #[error("interrupted while waiting to borrow")]
    Interrupted,
}
