//! A concurrent bag — a multi-producer/multi-consumer container for
//! pooling reusable, stateful resources (canonically, database
//! connections) across many worker threads with minimal contention.
//!
//! Unlike a blocking queue, items are never physically removed on borrow:
//! they stay in a shared registry and transition between logical states.
//! Each thread keeps a per-thread cache of recently-returned items so the
//! common borrow/return cycle is lock-free and contention-free; when a
//! thread's cache is empty it steals an idle item from the shared
//! registry, or parks on a sequence-gated wait station until one becomes
//! available.
//!
//! The bag is not a queue: no FIFO order is promised. It does not own item
//! lifetime beyond an explicit [`Bag::remove`], does not enforce capacity,
//! and is not persistent.
//!
//! # Example
//!
//! ```
//! use concurrent_bag::{Bag, BagConfig, PooledEntry};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let bag = Bag::<PooledEntry<&str>>::new(BagConfig::default());
//! bag.add(Arc::new(PooledEntry::new("connection-1"))).unwrap();
//!
//! let conn = bag.borrow(Duration::from_secs(1)).unwrap().expect("an item");
//! assert_eq!(*conn.payload(), "connection-1");
//! bag.requite(&conn).unwrap();
//! ```

mod affinity;
mod bag;
mod config;
mod error;
mod invariants;
mod item;
mod listener;
mod metrics;
mod registry;
mod wait;

pub use bag::Bag;
pub use config::{BagConfig, HIGH_CONTENTION_CONFIG};
pub use error::BagError;
pub use item::{BagEntry, ItemState, PooledEntry};
pub use listener::BagStateListener;
pub use metrics::MetricsSnapshot;
