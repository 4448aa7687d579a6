//! The external collaborator contract a pool owner implements to be
//! notified when the bag runs dry.

/// Upcall invoked from `borrow` when a shared-registry scan failed to find
/// an idle item. Implementations are expected to return promptly — e.g. by
/// enqueuing work for another worker to construct and `add` a fresh item —
/// since the bag does not await the effect synchronously and calls this
/// upcall on the borrowing thread itself.
///
/// The bag treats the absence of a listener as legal: no upcall fires, and
/// `borrow` simply proceeds to step 4 (parking).
pub trait BagStateListener: Send + Sync {
    /// Requests that a new item be constructed and added to the bag.
    /// Advisory: the bag does not retry or validate that an item actually
    /// shows up before parking.
    fn add_bag_item(&self);
}
