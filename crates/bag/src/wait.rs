//! Sequence-gated wait station — the primitive `borrow` parks on when
//! neither the affinity cache nor the shared registry has an idle item.
//!
//! # Synchronization strategy
//!
//! A `Mutex<State>` guards a monotonic `u64` sequence plus a FIFO queue of
//! waiter tickets; a `Condvar` provides the actual parking — a condition
//! variable guarding a 64-bit counter, the idiomatic Rust shape for a
//! custom long-valued synchronizer.
//!
//! `acquire` succeeds once the sequence has advanced past the caller's
//! witness *and* no earlier-arrived waiter is still ahead of it in the
//! queue — soft FIFO among parked waiters, without starving callers that
//! never need to park at all (the fast paths in `Bag::borrow` never touch
//! this queue).

use crate::invariants::debug_assert_sequence_monotonic;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Outcome of a call to [`WaitStation::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AcquireOutcome {
    /// The sequence advanced past the witness and this waiter's turn came up.
    Signaled,
    /// The timeout elapsed with no qualifying advance.
    TimedOut,
    /// [`WaitStation::interrupt_all`] was called while this waiter was parked.
    Interrupted,
}

struct State {
    sequence: u64,
    next_ticket: u64,
    queue: std::collections::VecDeque<u64>,
    stopped: bool,
}

pub(crate) struct WaitStation {
    state: Mutex<State>,
    condvar: Condvar,
}

impl WaitStation {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State {
                sequence: 1,
                next_ticket: 0,
                queue: std::collections::VecDeque::new(),
                stopped: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// The current sequence value, to be captured as a witness before a
    /// registry scan.
    pub(crate) fn witness(&self) -> u64 {
        self.state.lock().unwrap().sequence
    }

    /// Advances the sequence by one and wakes every waiter whose condition
    /// may now be satisfiable. Returns the new sequence value.
    pub(crate) fn advance(&self) -> u64 {
        let mut state = self.state.lock().unwrap();
        let old = state.sequence;
        state.sequence += 1;
        debug_assert_sequence_monotonic!(old, state.sequence);
        let new = state.sequence;
        drop(state);
        self.condvar.notify_all();
        new
    }

    /// Parks until the sequence exceeds `witness` and this call is at the
    /// front of the wait queue, `timeout` elapses, or
    /// [`Self::interrupt_all`] fires.
    pub(crate) fn acquire(&self, witness: u64, timeout: Duration) -> AcquireOutcome {
        let mut state = self.state.lock().unwrap();

        if state.stopped {
            return AcquireOutcome::Interrupted;
        }
        // Fast path: condition already holds and nobody is ahead of us.
        if state.sequence > witness && state.queue.is_empty() {
            return AcquireOutcome::Signaled;
        }

        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.queue.push_back(ticket);

        let deadline = Instant::now() + timeout;
        loop {
            if state.stopped {
                remove_ticket(&mut state.queue, ticket);
                return AcquireOutcome::Interrupted;
            }
            if state.sequence > witness && state.queue.front() == Some(&ticket) {
                state.queue.pop_front();
                return AcquireOutcome::Signaled;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                remove_ticket(&mut state.queue, ticket);
                return AcquireOutcome::TimedOut;
            }

            let (guard, _) = self.condvar.wait_timeout(state, remaining).unwrap();
            state = guard;
        }
    }

    /// Number of threads currently parked in [`Self::acquire`].
    pub(crate) fn pending_count(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }

    /// Releases every currently-parked waiter with [`AcquireOutcome::Interrupted`]
    /// and causes future `acquire` calls to return the same until cleared.
    ///
    /// Models the Rust equivalent of interrupting a blocked thread: there is
    /// no per-thread `Thread::interrupt` analog for a parked `Condvar` wait,
    /// so cancellation is a bag-wide signal the pool owner raises on
    /// shutdown (see DESIGN.md).
    pub(crate) fn interrupt_all(&self) {
        self.state.lock().unwrap().stopped = true;
        self.condvar.notify_all();
    }
}

fn remove_ticket(queue: &mut std::collections::VecDeque<u64>, ticket: u64) {
    if let Some(idx) = queue.iter().position(|t| *t == ticket) {
        queue.remove(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn acquire_succeeds_immediately_if_already_advanced() {
        let station = WaitStation::new();
        let witness = station.witness();
        station.advance();
        assert_eq!(
            station.acquire(witness, Duration::from_millis(10)),
            AcquireOutcome::Signaled
        );
    }

    #[test]
    fn acquire_times_out_with_no_advance() {
        let station = WaitStation::new();
        let witness = station.witness();
        let start = Instant::now();
        assert_eq!(
            station.acquire(witness, Duration::from_millis(30)),
            AcquireOutcome::TimedOut
        );
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn acquire_wakes_on_advance_from_another_thread() {
        let station = Arc::new(WaitStation::new());
        let witness = station.witness();
        let waiter = Arc::clone(&station);
        let handle = thread::spawn(move || waiter.acquire(witness, Duration::from_secs(5)));

        thread::sleep(Duration::from_millis(20));
        station.advance();

        assert_eq!(handle.join().unwrap(), AcquireOutcome::Signaled);
    }

    #[test]
    fn interrupt_all_releases_parked_waiters() {
        let station = Arc::new(WaitStation::new());
        let witness = station.witness();
        let waiter = Arc::clone(&station);
        let handle = thread::spawn(move || waiter.acquire(witness, Duration::from_secs(5)));

        thread::sleep(Duration::from_millis(20));
        station.interrupt_all();

        assert_eq!(handle.join().unwrap(), AcquireOutcome::Interrupted);
    }
}
