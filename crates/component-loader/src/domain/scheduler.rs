//! Deferred callbacks
//!
//! Single-threaded timer queue handed to components for their own use. The
//! host loop pumps it with [`DeferredQueue::take_due`]; the loader never
//! defers work of its own.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Just over one frame at 60 fps.
pub const DEFAULT_DEFER: Duration = Duration::from_millis(17);

/// A callback waiting for its due time.
pub type Deferred = Box<dyn FnOnce()>;

struct Entry {
    due: Instant,
    seq: u64,
    callback: Deferred,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap, we want the earliest entry on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of callbacks keyed by due time, FIFO among equal due times.
#[derive(Default)]
pub struct DeferredQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `callback` to run no earlier than `due`.
    pub fn defer_at(&mut self, due: Instant, callback: Deferred) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { due, seq, callback });
    }

    /// Remove and return every callback due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<Deferred> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|entry| entry.due <= now) {
            if let Some(entry) = self.heap.pop() {
                due.push(entry.callback);
            }
        }
        due
    }

    /// Earliest pending due time.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.heap.peek().map(|entry| entry.due)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
