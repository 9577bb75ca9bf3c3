//! Bounded, thread-safe FIFO queue with an activate/deactivate lifecycle.
//!
//! Grounded on `original_source/src/sirius/utils/concurrent_queue.h`: a
//! mutex-guarded `std::queue` plus two condition variables (one for
//! producers waiting on free capacity, one for consumers waiting on an
//! element), and an `is_active` flag that short-circuits both waits on
//! shutdown. The reference encodes the inactive case as a `std::error_code`
//! out-parameter and a default-constructed return value; Rust's `Result`
//! lets `pop` report "queue drained and inactive" without requiring `T:
//! Default` (see DESIGN.md).

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use freqxform_core::{Error, Result};

struct Inner<T> {
    items: VecDeque<T>,
    active: bool,
}

/// A fixed-capacity FIFO queue shared between a producer, `N` workers and a
/// consumer thread.
///
/// `push` blocks while the queue is full and active; `pop` blocks while the
/// queue is empty and active. Either call returns
/// [`Error::QueueInactive`] once [`deactivate`](Self::deactivate) has been
/// called and the blocking condition can no longer resolve productively.
pub struct ConcurrentQueue<T> {
    inner: Mutex<Inner<T>>,
    capacity: usize,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> ConcurrentQueue<T> {
    /// Creates an active queue bounded to `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                active: true,
            }),
            capacity: capacity.max(1),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    /// Pushes `value` onto the back of the queue, blocking while the queue
    /// is full and active.
    ///
    /// Returns [`Error::QueueInactive`] (dropping `value`) if the queue was
    /// or became inactive before a slot freed up.
    pub fn push(&self, value: T) -> Result<()> {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        loop {
            if !inner.active {
                return Err(Error::QueueInactive);
            }
            if inner.items.len() < self.capacity {
                break;
            }
            inner = self.not_full.wait(inner).expect("queue mutex poisoned");
        }
        inner.items.push_back(value);
        drop(inner);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Pops the front element, blocking while the queue is empty and
    /// active.
    ///
    /// Returns [`Error::QueueInactive`] once the queue is empty and
    /// inactive — there is nothing left to drain.
    pub fn pop(&self) -> Result<T> {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        loop {
            if let Some(value) = inner.items.pop_front() {
                drop(inner);
                self.not_full.notify_one();
                return Ok(value);
            }
            if !inner.active {
                return Err(Error::QueueInactive);
            }
            inner = self.not_empty.wait(inner).expect("queue mutex poisoned");
        }
    }

    /// True while the queue is active, or while it still holds buffered
    /// elements a caller could drain after deactivation.
    pub fn can_pop(&self) -> bool {
        let inner = self.inner.lock().expect("queue mutex poisoned");
        inner.active || !inner.items.is_empty()
    }

    /// True while the queue is still accepting new elements.
    pub fn is_active(&self) -> bool {
        self.inner.lock().expect("queue mutex poisoned").active
    }

    /// Number of buffered elements.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("queue mutex poisoned").items.len()
    }

    /// True when the queue currently holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wakes every blocked producer/consumer; no further pushes succeed,
    /// but buffered elements remain poppable until drained.
    pub fn deactivate(&self) {
        self.inner.lock().expect("queue mutex poisoned").active = false;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Like [`deactivate`](Self::deactivate), additionally discarding any
    /// buffered elements so pending consumers see an empty, inactive queue.
    pub fn deactivate_and_clear(&self) {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        inner.active = false;
        inner.items.clear();
        drop(inner);
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Re-activates the queue. Used by tests; the pipeline itself only ever
    /// deactivates.
    pub fn activate(&self) {
        self.inner.lock().expect("queue mutex poisoned").active = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn push_then_pop_roundtrips() {
        let queue = ConcurrentQueue::new(4);
        queue.push(42).unwrap();
        assert_eq!(queue.pop().unwrap(), 42);
    }

    #[test]
    fn push_after_deactivate_is_rejected() {
        let queue: ConcurrentQueue<i32> = ConcurrentQueue::new(4);
        queue.deactivate();
        assert!(matches!(queue.push(1), Err(Error::QueueInactive)));
    }

    #[test]
    fn pop_drains_buffered_elements_after_deactivate() {
        let queue = ConcurrentQueue::new(4);
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.deactivate();
        assert_eq!(queue.pop().unwrap(), 1);
        assert_eq!(queue.pop().unwrap(), 2);
        assert!(matches!(queue.pop(), Err(Error::QueueInactive)));
    }

    #[test]
    fn deactivate_and_clear_drops_buffered_elements() {
        let queue = ConcurrentQueue::new(4);
        queue.push(1).unwrap();
        queue.deactivate_and_clear();
        assert!(matches!(queue.pop(), Err(Error::QueueInactive)));
    }

    #[test]
    fn can_pop_reflects_buffered_elements_once_inactive() {
        let queue = ConcurrentQueue::new(4);
        queue.push(1).unwrap();
        queue.deactivate();
        assert!(queue.can_pop());
        queue.pop().unwrap();
        assert!(!queue.can_pop());
    }

    #[test]
    fn blocked_push_wakes_on_deactivate() {
        let queue = Arc::new(ConcurrentQueue::new(1));
        queue.push(1).unwrap(); // fill capacity

        let producer = {
            let queue = queue.clone();
            thread::spawn(move || queue.push(2))
        };

        thread::sleep(Duration::from_millis(20));
        queue.deactivate();
        let result = producer.join().unwrap();
        assert!(matches!(result, Err(Error::QueueInactive)));
    }

    #[test]
    fn blocked_pop_wakes_on_push() {
        let queue = Arc::new(ConcurrentQueue::new(4));
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.pop())
        };
        thread::sleep(Duration::from_millis(20));
        queue.push(7).unwrap();
        assert_eq!(consumer.join().unwrap().unwrap(), 7);
    }
}
