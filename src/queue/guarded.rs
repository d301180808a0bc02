//! Mutex-guarded linked deque
//!
//! Every operation of [`LinkedDeque`] behind one instance-wide lock, callable
//! through `&self` from any number of threads.

use core::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::{Mutex, MutexGuard};
use tracing::trace;

use crate::metrics::{AtomicMetrics, DequeMetrics, MetricsCollector};
use crate::queue::LinkedDeque;
use crate::{BulkError, PopManyError, Result, LOG_TARGET};

/// What a finished operation did, for metrics accounting
enum Outcome {
    Moved(usize),
    Empty,
    Violated { moved: usize },
}

/// A [`LinkedDeque`] guarded by a single mutex
///
/// Each method holds the lock for exactly one logical operation and releases
/// it on every exit path, errors included. There is no finer-grained locking,
/// no re-entrancy and no fairness promise among waiting callers. Pops never
/// wait for an element: an empty deque yields `Ok(None)` immediately.
///
/// # Examples
///
/// ```rust
/// use linkdeque::SafeLinkedDeque;
/// use std::sync::Arc;
/// use std::thread;
///
/// let queue = Arc::new(SafeLinkedDeque::new());
///
/// let producer = {
///     let queue = Arc::clone(&queue);
///     thread::spawn(move || queue.push_back_all(0..100))
/// };
/// assert_eq!(producer.join().unwrap().unwrap(), 100);
///
/// let drained = queue.pop_front_many(100).unwrap();
/// assert_eq!(drained, (0..100).collect::<Vec<_>>());
/// ```
#[derive(Debug)]
pub struct SafeLinkedDeque<T> {
    inner: Mutex<LinkedDeque<T>>,
    metrics: AtomicMetrics,
    metrics_enabled: AtomicBool,
}

impl<T> SafeLinkedDeque<T> {
    /// Create a new empty guarded deque with metrics enabled
    pub fn new() -> Self {
        Self::from(LinkedDeque::new())
    }

    /// Current number of elements
    ///
    /// The value can be stale as soon as the lock is released.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if the deque is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Locked [`LinkedDeque::push_back`]
    pub fn push_back(&self, value: T) -> Result<()> {
        self.run(
            |deque| deque.push_back(value),
            |result| match result {
                Ok(()) => Outcome::Moved(1),
                Err(_) => Outcome::Violated { moved: 0 },
            },
        )
    }

    /// Locked [`LinkedDeque::push_front`]
    pub fn push_front(&self, value: T) -> Result<()> {
        self.run(
            |deque| deque.push_front(value),
            |result| match result {
                Ok(()) => Outcome::Moved(1),
                Err(_) => Outcome::Violated { moved: 0 },
            },
        )
    }

    /// Locked [`LinkedDeque::push_back_all`]
    ///
    /// The input is consumed while the lock is held, so the whole batch lands
    /// contiguously.
    pub fn push_back_all<I>(&self, items: I) -> core::result::Result<usize, BulkError>
    where
        I: IntoIterator<Item = T>,
    {
        self.run(|deque| deque.push_back_all(items), bulk_push_outcome)
    }

    /// Locked [`LinkedDeque::push_front_all`]
    ///
    /// Each item becomes the new front in turn, so the batch ends up reversed
    /// at the front of the deque.
    pub fn push_front_all<I>(&self, items: I) -> core::result::Result<usize, BulkError>
    where
        I: IntoIterator<Item = T>,
    {
        self.run(|deque| deque.push_front_all(items), bulk_push_outcome)
    }

    /// Locked [`LinkedDeque::pop_front`]
    pub fn pop_front(&self) -> Result<Option<T>> {
        self.run(LinkedDeque::pop_front, |result| match result {
            Ok(Some(_)) => Outcome::Moved(1),
            Ok(None) => Outcome::Empty,
            Err(_) => Outcome::Violated { moved: 0 },
        })
    }

    /// Locked [`LinkedDeque::pop_front_many`]
    pub fn pop_front_many(&self, count: usize) -> core::result::Result<Vec<T>, PopManyError<T>> {
        self.run(
            |deque| deque.pop_front_many(count),
            |result| match result {
                Ok(items) if items.is_empty() && count > 0 => Outcome::Empty,
                Ok(items) => Outcome::Moved(items.len()),
                Err(err) => Outcome::Violated {
                    moved: err.completed(),
                },
            },
        )
    }

    /// Mutable access to the unguarded deque
    ///
    /// No locking is needed: `&mut self` already proves exclusive access.
    pub fn get_mut(&mut self) -> &mut LinkedDeque<T> {
        self.inner.get_mut()
    }

    /// Consume the guard and return the unguarded deque
    pub fn into_inner(self) -> LinkedDeque<T> {
        self.inner.into_inner()
    }

    fn acquire(&self) -> MutexGuard<'_, LinkedDeque<T>> {
        if let Some(guard) = self.inner.try_lock() {
            return guard;
        }

        trace!(target: LOG_TARGET, "deque lock contended");
        if self.is_metrics_enabled() {
            self.metrics.record_contention();
        }
        self.inner.lock()
    }

    /// Run `op` under the lock, then account for what it did
    fn run<R>(
        &self,
        op: impl FnOnce(&mut LinkedDeque<T>) -> R,
        outcome: impl FnOnce(&R) -> Outcome,
    ) -> R {
        let enabled = self.is_metrics_enabled();

        let mut guard = self.acquire();
        let start = enabled.then(Instant::now);
        let result = op(&mut *guard);
        let len = guard.len();
        drop(guard);

        if let Some(start) = start {
            self.metrics.record_operation(start.elapsed());
            self.metrics.observe_len(len);
            match outcome(&result) {
                Outcome::Moved(count) => self.metrics.record_moved(count),
                Outcome::Empty => self.metrics.record_empty_pop(),
                Outcome::Violated { moved } => {
                    self.metrics.record_moved(moved);
                    self.metrics.record_violation();
                }
            }
        }

        result
    }
}

fn bulk_push_outcome(result: &core::result::Result<usize, BulkError>) -> Outcome {
    match result {
        Ok(count) => Outcome::Moved(*count),
        Err(err) => Outcome::Violated {
            moved: err.completed,
        },
    }
}

impl<T> Default for SafeLinkedDeque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<LinkedDeque<T>> for SafeLinkedDeque<T> {
    fn from(deque: LinkedDeque<T>) -> Self {
        Self {
            inner: Mutex::new(deque),
            metrics: AtomicMetrics::default(),
            metrics_enabled: AtomicBool::new(true),
        }
    }
}

impl<T> FromIterator<T> for SafeLinkedDeque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(LinkedDeque::from_iter(iter))
    }
}

impl<T> MetricsCollector for SafeLinkedDeque<T> {
    fn metrics(&self) -> DequeMetrics {
        self.metrics.snapshot()
    }

    fn reset_metrics(&self) {
        self.metrics.reset();
    }

    fn set_metrics_enabled(&self, enabled: bool) {
        self.metrics_enabled.store(enabled, Ordering::Relaxed);
    }

    fn is_metrics_enabled(&self) -> bool {
        self.metrics_enabled.load(Ordering::Relaxed)
    }
}
