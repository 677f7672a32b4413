//! Sequential scheduler: cancellation-safe timed steps fenced by a
//! monotonic run token.
//!
//! Steps are plain command values executed by their owner, not boxed
//! closures. Each enqueued step is tagged with the token current at
//! schedule time; bumping the token via [`Scheduler::next_run_token`]
//! invalidates every not-yet-fired step at once. That fence is the sole
//! cancellation mechanism — no per-step bookkeeping exists anywhere else.
//!
//! Callers supply the current instant, so tests drive virtual time and
//! production callers pass [`Instant::now`]. Dropping the scheduler drops
//! every pending step.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// One pending step.
#[derive(Debug)]
struct Entry<T> {
    /// When the step fires.
    due: Instant,
    /// Tie-breaker so same-instant steps fire in FIFO order.
    seq: u64,
    /// Run token captured at schedule time.
    token: u64,
    /// The step itself.
    step: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.due.cmp(&other.due).then(self.seq.cmp(&other.seq))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Token-fenced queue of timed steps.
#[derive(Debug)]
pub struct Scheduler<T> {
    /// Current run token; steps from earlier tokens are stale.
    token: u64,
    /// Next FIFO sequence number.
    seq: u64,
    /// Pending steps, earliest due first.
    queue: BinaryHeap<Reverse<Entry<T>>>,
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler at run token zero.
    pub fn new() -> Self {
        Self {
            token: 0,
            seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// The current run token.
    pub const fn token(&self) -> u64 {
        self.token
    }

    /// Enqueue a step due `delay` after `now`, tagged with the current
    /// token.
    pub fn schedule(&mut self, step: T, delay: Duration, now: Instant) {
        let entry = Entry {
            due: now + delay,
            seq: self.seq,
            token: self.token,
            step,
        };
        self.seq += 1;
        self.queue.push(Reverse(entry));
    }

    /// Pop the earliest step due at or before `now`.
    ///
    /// Steps tagged with a stale token are silently discarded at fire
    /// time, never executed.
    pub fn pop_due(&mut self, now: Instant) -> Option<T> {
        while let Some(Reverse(entry)) = self.queue.peek() {
            if entry.due > now {
                return None;
            }
            let Reverse(entry) = self.queue.pop()?;
            if entry.token == self.token {
                return Some(entry.step);
            }
            // Stale run; discard and keep looking.
        }
        None
    }

    /// Earliest due instant among live (current-token) steps.
    pub fn next_due(&self) -> Option<Instant> {
        self.queue
            .iter()
            .filter(|Reverse(entry)| entry.token == self.token)
            .map(|Reverse(entry)| entry.due)
            .min()
    }

    /// Clear the pending queue without changing the token.
    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }

    /// Increment the run token, invalidating every previously scheduled
    /// step, and clear the queue. Returns the new token.
    pub fn next_run_token(&mut self) -> u64 {
        self.token += 1;
        self.queue.clear();
        self.token
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
