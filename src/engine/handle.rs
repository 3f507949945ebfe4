//! One-shot completion handles linking a job's producer and its waiters.
//!
//! [`completion`] returns a linked pair: the [`Completer`] travels with the
//! job to whichever worker processes it, the [`Waiter`] stays with the
//! caller. The value is set at most once and, once set, is observable by any
//! number of waiter clones. Each handle carries its own lock, independent of
//! the job queue's, and the two are never held together.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

/// A handle's setter was invoked a second time.
///
/// This is a programmer-contract violation: exactly one worker owns each
/// job, so a correct engine never produces it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Completion handle already completed")]
pub struct DoubleCompletion;

enum SlotState<T> {
    Pending,
    Ready(T),
    /// Setter dropped without completing (worker died mid-job).
    Abandoned,
}

struct Slot<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

/// Creates a linked (setter, waiter) pair around a fresh slot.
pub fn completion<T>() -> (Completer<T>, Waiter<T>) {
    let slot = Arc::new(Slot {
        state: Mutex::new(SlotState::Pending),
        ready: Condvar::new(),
    });
    (
        Completer { slot: slot.clone() },
        Waiter { slot },
    )
}

/// Setter side of a completion handle. Not cloneable: one producer per job.
pub struct Completer<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Completer<T> {
    /// Stores the result and wakes every waiter.
    ///
    /// Fails with [`DoubleCompletion`] if the slot was already completed.
    pub fn complete(&self, value: T) -> Result<(), DoubleCompletion> {
        let mut state = self.slot.state.lock();
        match *state {
            SlotState::Pending => {
                *state = SlotState::Ready(value);
                self.slot.ready.notify_all();
                Ok(())
            }
            _ => Err(DoubleCompletion),
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        let mut state = self.slot.state.lock();
        if matches!(*state, SlotState::Pending) {
            // Waiters must not block forever on a job that will never
            // finish; they fail fast instead.
            *state = SlotState::Abandoned;
            self.slot.ready.notify_all();
        }
    }
}

/// Waiter side of a completion handle.
///
/// Cloneable for fan-out polling: every clone observes the same value once
/// it is set.
pub struct Waiter<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for Waiter<T> {
    fn clone(&self) -> Self {
        Self { slot: self.slot.clone() }
    }
}

impl<T: Clone> Waiter<T> {
    /// Blocks the calling thread until the value is available.
    ///
    /// # Panics
    /// Panics if the setter was dropped without completing. That only
    /// happens when a worker died mid-job, which is fatal by design.
    pub fn wait(&self) -> T {
        let mut state = self.slot.state.lock();
        self.slot
            .ready
            .wait_while(&mut state, |s| matches!(s, SlotState::Pending));
        match &*state {
            SlotState::Ready(value) => value.clone(),
            SlotState::Abandoned => panic!("Completion handle abandoned: setter dropped without completing"),
            SlotState::Pending => unreachable!(),
        }
    }

    /// Blocks up to `timeout` for the value.
    ///
    /// Returns `None` if the slot is still pending when the timeout
    /// elapses. The value is never lost: a later call still observes it.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<T> {
        let mut state = self.slot.state.lock();
        self.slot
            .ready
            .wait_while_for(&mut state, |s| matches!(s, SlotState::Pending), timeout);
        match &*state {
            SlotState::Ready(value) => Some(value.clone()),
            SlotState::Abandoned => panic!("Completion handle abandoned: setter dropped without completing"),
            SlotState::Pending => None,
        }
    }

    /// Non-blocking poll: returns the value if it has been set.
    pub fn try_wait(&self) -> Option<T> {
        match &*self.slot.state.lock() {
            SlotState::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl<T> Waiter<T> {
    /// Whether the value has been set.
    pub fn is_ready(&self) -> bool {
        matches!(*self.slot.state.lock(), SlotState::Ready(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn wait_observes_completed_value() {
        let (completer, waiter) = completion();
        let handle = thread::spawn(move || waiter.wait());
        completer.complete(42).unwrap();
        assert_eq!(handle.join().unwrap(), 42);
    }

    #[test]
    fn second_complete_is_rejected() {
        let (completer, waiter) = completion();
        completer.complete("first").unwrap();
        assert_eq!(completer.complete("second"), Err(DoubleCompletion));
        assert_eq!(waiter.wait(), "first");
    }

    #[test]
    fn timeout_does_not_lose_the_value() {
        let (completer, waiter) = completion();
        assert_eq!(waiter.wait_timeout(Duration::from_millis(10)), None);
        completer.complete(7).unwrap();
        assert_eq!(waiter.wait_timeout(Duration::from_millis(10)), Some(7));
        assert_eq!(waiter.try_wait(), Some(7));
    }

    #[test]
    fn all_waiter_clones_observe_the_same_value() {
        let (completer, waiter) = completion();
        let clones: Vec<_> = (0..3).map(|_| waiter.clone()).collect();
        completer.complete(String::from("done")).unwrap();
        for clone in clones {
            assert_eq!(clone.wait(), "done");
        }
    }

    #[test]
    #[should_panic(expected = "abandoned")]
    fn abandoned_handle_fails_fast() {
        let (completer, waiter) = completion::<u32>();
        drop(completer);
        waiter.wait();
    }
}
