//! Blocking batch FIFO
//!
//! Producers append whole batches; consumers take one item at a time and
//! block while the queue is empty. Waiters are woken with `notify_all` only
//! on the empty → non-empty transition and re-check on wake-up.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Unbounded multi-producer / multi-consumer FIFO
pub struct WorkQueue<T> {
    state: Mutex<State<T>>,
    available: Condvar,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State { items: VecDeque::new(), closed: false }),
            available: Condvar::new(),
        }
    }

    /// Append `batch` in order; an empty batch is a no-op
    pub fn enqueue_batch<I>(&self, batch: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        let was_empty = state.items.is_empty();
        state.items.extend(batch);
        if was_empty && !state.items.is_empty() {
            self.available.notify_all();
        }
    }

    /// Oldest item, blocking until one is available
    ///
    /// Returns `None` once the queue is closed.
    pub fn dequeue(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            self.available.wait(&mut state);
        }
    }

    /// Oldest item without blocking
    pub fn try_dequeue(&self) -> Option<T> {
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        state.items.pop_front()
    }

    /// Snapshot; may be stale by the time the caller looks at it
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Stop handing out items and wake every blocked consumer
    ///
    /// Items still queued are dropped; returns how many.
    pub fn close(&self) -> usize {
        let mut state = self.state.lock();
        state.closed = true;
        let dropped = state.items.len();
        state.items.clear();
        self.available.notify_all();
        dropped
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
