//! Operation Metrics Module
//!
//! Counters collected by the guarded tier: how many operations ran, how many
//! elements they moved, how often the lock was contended and how long it was
//! held. Collection uses relaxed atomics and never takes the deque lock.

use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Point-in-time snapshot of a deque's metrics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DequeMetrics {
    /// Total number of guarded operations performed
    pub total_operations: u64,
    /// Number of elements pushed or popped
    pub moved_elements: u64,
    /// Number of pops that found the deque empty
    pub empty_pops: u64,
    /// Number of operations that hit an invariant violation
    pub invariant_violations: u64,
    /// Number of operations that found the lock already held
    pub contended_operations: u64,
    /// Average lock hold time in nanoseconds
    pub avg_operation_time_ns: u64,
    /// Maximum lock hold time in nanoseconds
    pub max_operation_time_ns: u64,
    /// Largest length observed after an operation
    pub peak_len: usize,
}

impl DequeMetrics {
    /// Operations that completed without an invariant violation, as percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_operations == 0 {
            0.0
        } else {
            let succeeded = self.total_operations.saturating_sub(self.invariant_violations);
            (succeeded as f64 / self.total_operations as f64) * 100.0
        }
    }

    /// Calculate contention rate as percentage
    pub fn contention_rate(&self) -> f64 {
        if self.total_operations == 0 {
            0.0
        } else {
            (self.contended_operations as f64 / self.total_operations as f64) * 100.0
        }
    }

    /// Calculate invariant violation rate as percentage
    pub fn violation_rate(&self) -> f64 {
        if self.total_operations == 0 {
            0.0
        } else {
            (self.invariant_violations as f64 / self.total_operations as f64) * 100.0
        }
    }

    /// Get average lock hold time as Duration
    pub fn avg_operation_time(&self) -> Duration {
        Duration::from_nanos(self.avg_operation_time_ns)
    }

    /// Get maximum lock hold time as Duration
    pub fn max_operation_time(&self) -> Duration {
        Duration::from_nanos(self.max_operation_time_ns)
    }
}

/// Internal atomic metrics collection
#[derive(Debug, Default)]
pub(crate) struct AtomicMetrics {
    total_operations: AtomicU64,
    moved_elements: AtomicU64,
    empty_pops: AtomicU64,
    invariant_violations: AtomicU64,
    contended_operations: AtomicU64,
    total_time_ns: AtomicU64,
    max_time_ns: AtomicU64,
    peak_len: AtomicUsize,
}

impl AtomicMetrics {
    /// Record one finished operation and how long it held the lock
    pub(crate) fn record_operation(&self, duration: Duration) {
        let duration_ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

        self.total_operations.fetch_add(1, Ordering::Relaxed);
        self.total_time_ns.fetch_add(duration_ns, Ordering::Relaxed);
        self.max_time_ns.fetch_max(duration_ns, Ordering::Relaxed);
    }

    /// Record elements pushed or popped by an operation
    pub(crate) fn record_moved(&self, count: usize) {
        self.moved_elements.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a pop that found nothing
    pub(crate) fn record_empty_pop(&self) {
        self.empty_pops.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an invariant violation
    pub(crate) fn record_violation(&self) {
        self.invariant_violations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a contended lock acquisition
    pub(crate) fn record_contention(&self) {
        self.contended_operations.fetch_add(1, Ordering::Relaxed);
    }

    /// Track the peak length
    pub(crate) fn observe_len(&self, len: usize) {
        self.peak_len.fetch_max(len, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub(crate) fn snapshot(&self) -> DequeMetrics {
        let total_ops = self.total_operations.load(Ordering::Relaxed);
        let total_time = self.total_time_ns.load(Ordering::Relaxed);

        DequeMetrics {
            total_operations: total_ops,
            moved_elements: self.moved_elements.load(Ordering::Relaxed),
            empty_pops: self.empty_pops.load(Ordering::Relaxed),
            invariant_violations: self.invariant_violations.load(Ordering::Relaxed),
            contended_operations: self.contended_operations.load(Ordering::Relaxed),
            avg_operation_time_ns: if total_ops > 0 { total_time / total_ops } else { 0 },
            max_operation_time_ns: self.max_time_ns.load(Ordering::Relaxed),
            peak_len: self.peak_len.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub(crate) fn reset(&self) {
        self.total_operations.store(0, Ordering::Relaxed);
        self.moved_elements.store(0, Ordering::Relaxed);
        self.empty_pops.store(0, Ordering::Relaxed);
        self.invariant_violations.store(0, Ordering::Relaxed);
        self.contended_operations.store(0, Ordering::Relaxed);
        self.total_time_ns.store(0, Ordering::Relaxed);
        self.max_time_ns.store(0, Ordering::Relaxed);
        self.peak_len.store(0, Ordering::Relaxed);
    }
}

/// Trait for data structures that support metrics collection
pub trait MetricsCollector {
    /// Get current metrics
    fn metrics(&self) -> DequeMetrics;

    /// Reset all metrics
    fn reset_metrics(&self);

    /// Enable or disable metrics collection
    fn set_metrics_enabled(&self, enabled: bool);

    /// Check if metrics collection is enabled
    fn is_metrics_enabled(&self) -> bool;
}
