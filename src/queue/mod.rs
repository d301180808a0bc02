//! Queue implementations
//!
//! This module provides the linked deque in its two tiers.
//!
//! ## Available Queues
//!
//! - [`LinkedDeque`]: unguarded, `&mut self` mutators, available without `std`
//! - [`SafeLinkedDeque`]: the same operations behind one mutex, `&self` mutators
//!
//! ## Choosing a Tier
//!
//! - **Single owner**: use `LinkedDeque` directly; the borrow checker already
//!   rules out concurrent mutation.
//! - **Shared across threads**: use `SafeLinkedDeque`, typically inside an
//!   `Arc`. Each call takes the lock once; a bulk call holds it for the whole
//!   batch.
//! - **Own locking**: wrap a `LinkedDeque` in your lock of choice if several
//!   operations must be atomic together.
//!
//! ## Performance Characteristics
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `push_back` / `push_front` | O(1), one allocation |
//! | `pop_front` | O(1), one deallocation |
//! | `push_*_all` / `pop_front_many` | O(n) |
//! | `len` | O(1) |
//!
//! ## Examples
//!
//! ```rust
//! use linkdeque::queue::{LinkedDeque, SafeLinkedDeque};
//!
//! let mut local = LinkedDeque::new();
//! local.push_back_all([1, 2, 3]).unwrap();
//!
//! let shared = SafeLinkedDeque::from(local);
//! shared.push_front(0)?;
//! assert_eq!(shared.pop_front_many(4).unwrap(), vec![0, 1, 2, 3]);
//! # Ok::<(), linkdeque::Error>(())
//! ```
pub mod linked;

#[cfg(feature = "std")]
#[cfg_attr(feature = "unstable", doc(cfg(feature = "std")))]
pub mod guarded;

// Re-export main types for convenience
pub use linked::{IntoIter, Iter, IterMut, LinkedDeque};

#[cfg(feature = "std")]
pub use guarded::SafeLinkedDeque;

// Include test modules
#[cfg(all(test, feature = "std"))]
mod tests;

#[cfg(all(test, feature = "std"))]
mod proptests;
