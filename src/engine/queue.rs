//! Bounded multi-producer/multi-consumer job channel.
//!
//! All queue state, including the closed flag, lives under one mutex, and a
//! single condvar is shared by producers waiting for room and consumers
//! waiting for work. Every mutation that can satisfy a waiting predicate
//! notifies all waiters, and every predicate is re-checked after each wake,
//! so spurious wakeups and competing producers are handled uniformly.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::utils::{DispatchError, DispatchResult};

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// FIFO channel with an optional soft capacity limit.
///
/// Capacity is enforced on the producer side by blocking, never by dropping
/// or erroring. Capacity and group size are independent: a group larger than
/// the capacity is admitted once the queue is empty, so it can never
/// deadlock against an unsatisfiable predicate.
pub struct BoundedQueue<T> {
    inner: Mutex<Inner<T>>,
    signal: Condvar,
    capacity: Option<usize>,
}

impl<T> BoundedQueue<T> {
    /// Creates a queue that admits at most `capacity` items.
    pub fn bounded(capacity: usize) -> Self {
        Self::with_capacity(Some(capacity))
    }

    /// Creates a queue with no capacity limit.
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    pub(crate) fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                closed: false,
            }),
            signal: Condvar::new(),
            capacity,
        }
    }

    fn admits(capacity: Option<usize>, occupied: usize, group: usize) -> bool {
        match capacity {
            None => true,
            Some(limit) => occupied + group <= limit || occupied == 0,
        }
    }

    /// Pushes `group` as one atomic unit, blocking until there is room.
    ///
    /// No consumer can observe a partially pushed group. Fails with
    /// [`DispatchError::Stopped`] if the queue is closed, including while
    /// blocked waiting for room.
    pub fn push_all(&self, group: Vec<T>) -> DispatchResult<()> {
        let mut inner = self.inner.lock();
        self.signal.wait_while(&mut inner, |inner| {
            !inner.closed && !Self::admits(self.capacity, inner.items.len(), group.len())
        });
        if inner.closed {
            return Err(DispatchError::stopped("Queue closed during push"));
        }
        debug!("Admitting group of {} (queue size {})", group.len(), inner.items.len());
        inner.items.extend(group);
        self.signal.notify_all();
        Ok(())
    }

    /// Pops the oldest item, blocking while the queue is empty and open.
    ///
    /// Returns `None` only once the queue is both closed and drained: items
    /// already pushed at close time are still handed out ("closed but not
    /// abandoned").
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        self.signal
            .wait_while(&mut inner, |inner| inner.items.is_empty() && !inner.closed);
        let item = inner.items.pop_front();
        if item.is_some() {
            // Room freed: producers blocked on the capacity predicate re-check.
            self.signal.notify_all();
        }
        item
    }

    /// Closes the queue and wakes every waiter. Idempotent; returns whether
    /// this call performed the transition.
    pub fn close(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.closed {
            return false;
        }
        inner.closed = true;
        debug!("Queue closed with {} items still queued", inner.items.len());
        drop(inner);
        self.signal.notify_all();
        true
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Current number of queued items.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Configured capacity limit, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn pop_preserves_fifo_order() {
        let queue = BoundedQueue::unbounded();
        queue.push_all(vec![1, 2, 3]).unwrap();
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
    }

    #[test]
    fn closed_queue_still_drains() {
        let queue = BoundedQueue::unbounded();
        queue.push_all(vec!["a", "b"]).unwrap();
        assert!(queue.close());
        assert!(!queue.close());
        assert_eq!(queue.pop(), Some("a"));
        assert_eq!(queue.pop(), Some("b"));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn push_after_close_is_rejected() {
        let queue = BoundedQueue::unbounded();
        queue.close();
        assert!(matches!(
            queue.push_all(vec![1]),
            Err(DispatchError::Stopped(_))
        ));
    }

    #[test]
    fn full_queue_blocks_producer_until_room() {
        let queue = Arc::new(BoundedQueue::bounded(2));
        queue.push_all(vec![1, 2]).unwrap();

        let producer = {
            let queue = queue.clone();
            thread::spawn(move || queue.push_all(vec![3]).unwrap())
        };
        thread::sleep(Duration::from_millis(50));
        assert!(!producer.is_finished());
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop(), Some(1));
        producer.join().unwrap();
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn oversized_group_is_admitted_when_empty() {
        let queue = BoundedQueue::bounded(2);
        queue.push_all(vec![1, 2, 3]).unwrap();
        assert_eq!(queue.len(), 3);
    }
}
