//! # linkdeque
//!
//! A singly linked queue that accepts elements at either end and hands them out
//! from the front, in two tiers:
//!
//! - [`LinkedDeque`]: the unguarded tier. Every mutator takes `&mut self`, so
//!   exclusive access is checked by the compiler and no lock is paid for.
//! - [`SafeLinkedDeque`]: the guarded tier. A single mutex per instance is held
//!   for exactly one logical operation, which makes every method callable
//!   through a shared reference from many threads.
//!
//! ## Quick Start
//!
//! ```rust
//! use linkdeque::LinkedDeque;
//!
//! let mut queue = LinkedDeque::new();
//! queue.push_back(2)?;
//! queue.push_back(3)?;
//! queue.push_front(1)?;
//!
//! assert_eq!(queue.len(), 3);
//! assert_eq!(queue.pop_front()?, Some(1));
//! assert_eq!(queue.pop_front_many(10).unwrap(), vec![2, 3]);
//! assert_eq!(queue.pop_front()?, None);
//! # Ok::<(), linkdeque::Error>(())
//! ```
//!
//! ## Thread Safety
//!
//! ```rust
//! use linkdeque::SafeLinkedDeque;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue = Arc::new(SafeLinkedDeque::new());
//! let handles: Vec<_> = (0..4)
//!     .map(|id| {
//!         let queue = Arc::clone(&queue);
//!         thread::spawn(move || queue.push_back(id))
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap()?;
//! }
//! assert_eq!(queue.len(), 4);
//! # Ok::<(), linkdeque::Error>(())
//! ```
//!
//! ## Errors
//!
//! The only failure is [`Error::InvariantViolation`], reported when the node
//! chain is found in an inconsistent state. Popping from an empty queue is not
//! an error. Bulk operations report how far they got through [`BulkError`] and
//! [`PopManyError`].
//!
//! ## Features
//!
//! - `std` (default): the guarded tier, metrics and `std` support for the error
//!   and logging dependencies. Without it the crate is `no_std` + `alloc` and
//!   provides only [`LinkedDeque`].

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(feature = "unstable", feature(doc_cfg))]

extern crate alloc;

use alloc::vec::Vec;

pub mod queue;

#[cfg(feature = "std")]
#[cfg_attr(feature = "unstable", doc(cfg(feature = "std")))]
pub mod metrics;

pub use crate::queue::LinkedDeque;
#[cfg(feature = "std")]
pub use crate::queue::SafeLinkedDeque;

/// Target used for every `tracing` event emitted by this crate.
pub(crate) const LOG_TARGET: &str = "linkdeque";

/// Error type for deque operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The head/tail bookkeeping no longer describes a valid chain.
    ///
    /// The instance should not be trusted after this is returned; no repair
    /// or rollback is attempted.
    #[error("deque invariant violated: {reason}")]
    InvariantViolation {
        /// Which consistency check failed
        reason: &'static str,
    },
}

impl Error {
    pub(crate) const fn invariant(reason: &'static str) -> Self {
        Error::InvariantViolation { reason }
    }
}

/// Result type for deque operations
pub type Result<T> = core::result::Result<T, Error>;

/// A bulk push stopped before consuming all of its input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bulk push stopped after {completed} element(s): {source}")]
pub struct BulkError {
    /// Number of elements pushed before the failure
    pub completed: usize,
    /// The error that stopped the operation
    pub source: Error,
}

/// A bulk pop stopped before reaching its requested count.
///
/// The elements removed before the failure are handed back in `items`, in
/// front-to-back order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bulk pop stopped after {} element(s): {source}", .items.len())]
pub struct PopManyError<T> {
    /// Elements popped before the failure
    pub items: Vec<T>,
    /// The error that stopped the operation
    pub source: Error,
}

impl<T> PopManyError<T> {
    /// Number of elements popped before the failure
    pub fn completed(&self) -> usize {
        self.items.len()
    }

    /// Split into the recovered elements and the underlying error
    pub fn into_parts(self) -> (Vec<T>, Error) {
        (self.items, self.source)
    }
}
