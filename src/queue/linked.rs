//! Unguarded linked deque
//!
//! A singly linked chain of heap nodes with an owning head reference and a
//! non-owning tail reference. Elements go in at either end and come out at
//! the front, all in O(1).

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

use tracing::{debug, warn};

use crate::{BulkError, Error, PopManyError, Result, LOG_TARGET};

/// A cell in the chain.
///
/// Every node is owned by exactly one link: the deque's `head` or the `next`
/// field of its predecessor. The deque's `tail` only borrows the last node.
struct Node<T> {
    value: T,
    next: Option<NonNull<Node<T>>>,
}

impl<T> Node<T> {
    /// Allocate a detached node and hand back ownership as a raw pointer
    fn alloc(value: T) -> NonNull<Node<T>> {
        NonNull::from(Box::leak(Box::new(Node { value, next: None })))
    }
}

/// A singly linked queue with insertion at both ends and removal at the front.
///
/// This is the unguarded tier: every mutator takes `&mut self`, so callers
/// sharing a deque between threads must wrap it in a lock. [`SafeLinkedDeque`]
/// does exactly that.
///
/// Mutators return [`Result`] because they check the head/tail bookkeeping
/// before touching the chain. A deque driven only through this API never
/// fails those checks; an [`Error::InvariantViolation`] means the instance
/// is corrupt.
///
/// # Examples
///
/// ```rust
/// use linkdeque::LinkedDeque;
///
/// let mut queue = LinkedDeque::new();
/// queue.push_back("b")?;
/// queue.push_front("a")?;
///
/// assert_eq!(queue.front(), Some(&"a"));
/// assert_eq!(queue.back(), Some(&"b"));
/// assert_eq!(queue.pop_front()?, Some("a"));
/// # Ok::<(), linkdeque::Error>(())
/// ```
///
/// [`SafeLinkedDeque`]: crate::SafeLinkedDeque
pub struct LinkedDeque<T> {
    head: Option<NonNull<Node<T>>>,
    tail: Option<NonNull<Node<T>>>,
    len: usize,
    marker: PhantomData<Box<Node<T>>>,
}

// SAFETY: the deque owns its nodes exactly like a `Box` chain would, so it is
// as thread-safe as `T` is.
unsafe impl<T: Send> Send for LinkedDeque<T> {}
// SAFETY: `&LinkedDeque<T>` only hands out `&T`.
unsafe impl<T: Sync> Sync for LinkedDeque<T> {}

impl<T> LinkedDeque<T> {
    /// Create a new empty deque
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linkdeque::LinkedDeque;
    ///
    /// let queue: LinkedDeque<i32> = LinkedDeque::new();
    /// assert!(queue.is_empty());
    /// ```
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            marker: PhantomData,
        }
    }

    /// Number of elements in the deque
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the deque is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a value at the back
    ///
    /// # Errors
    ///
    /// [`Error::InvariantViolation`] if the endpoints are inconsistent; the
    /// deque is left untouched and `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linkdeque::LinkedDeque;
    ///
    /// let mut queue = LinkedDeque::new();
    /// queue.push_back(1)?;
    /// queue.push_back(2)?;
    /// assert_eq!(queue.pop_front()?, Some(1));
    /// # Ok::<(), linkdeque::Error>(())
    /// ```
    pub fn push_back(&mut self, value: T) -> Result<()> {
        self.check_ends()?;
        self.link_back(Node::alloc(value));
        Ok(())
    }

    /// Prepend a value at the front
    ///
    /// The new value is the next one [`pop_front`](Self::pop_front) returns.
    ///
    /// # Errors
    ///
    /// [`Error::InvariantViolation`] if the endpoints are inconsistent; the
    /// deque is left untouched and `value` is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linkdeque::LinkedDeque;
    ///
    /// let mut queue = LinkedDeque::new();
    /// queue.push_front(1)?;
    /// queue.push_front(2)?;
    /// assert_eq!(queue.pop_front()?, Some(2));
    /// # Ok::<(), linkdeque::Error>(())
    /// ```
    pub fn push_front(&mut self, value: T) -> Result<()> {
        self.check_ends()?;
        let node = Node::alloc(value);
        match self.head {
            // SAFETY: `node` was just allocated and nothing else points at it.
            Some(head) => unsafe { (*node.as_ptr()).next = Some(head) },
            None => self.tail = Some(node),
        }
        self.head = Some(node);
        self.len += 1;
        Ok(())
    }

    /// Append every value of `items` at the back, in iteration order
    ///
    /// Returns how many values were pushed. On failure the remaining input is
    /// dropped and [`BulkError::completed`] tells how far the push got.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linkdeque::LinkedDeque;
    ///
    /// let mut queue = LinkedDeque::new();
    /// assert_eq!(queue.push_back_all(['a', 'b', 'c']).unwrap(), 3);
    /// assert_eq!(queue.pop_front_many(3).unwrap(), vec!['a', 'b', 'c']);
    /// ```
    pub fn push_back_all<I>(&mut self, items: I) -> core::result::Result<usize, BulkError>
    where
        I: IntoIterator<Item = T>,
    {
        self.push_each(items, Self::push_back)
    }

    /// Prepend every value of `items` at the front, one at a time
    ///
    /// Each value becomes the new front in turn, so the block ends up in
    /// reverse: pushing `[a, b, c]` onto `[x]` gives `[c, b, a, x]`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linkdeque::LinkedDeque;
    ///
    /// let mut queue = LinkedDeque::new();
    /// queue.push_back('x')?;
    /// assert_eq!(queue.push_front_all(['a', 'b', 'c']).unwrap(), 3);
    /// assert_eq!(queue.pop_front_many(4).unwrap(), vec!['c', 'b', 'a', 'x']);
    /// # Ok::<(), linkdeque::Error>(())
    /// ```
    pub fn push_front_all<I>(&mut self, items: I) -> core::result::Result<usize, BulkError>
    where
        I: IntoIterator<Item = T>,
    {
        self.push_each(items, Self::push_front)
    }

    /// Remove and return the front value
    ///
    /// An empty deque yields `Ok(None)` and is left as it was.
    ///
    /// # Errors
    ///
    /// [`Error::InvariantViolation`] if the length says there are elements but
    /// the head is missing.
    pub fn pop_front(&mut self) -> Result<Option<T>> {
        if self.len == 0 {
            return Ok(None);
        }

        let Some(head) = self.head else {
            return Err(self.violation("length is nonzero but head is missing"));
        };

        // SAFETY: `head` came from `Node::alloc` and is owned by the chain;
        // advancing `self.head` below transfers that ownership to `node`.
        let mut node = unsafe { Box::from_raw(head.as_ptr()) };
        self.head = node.next.take();
        self.len -= 1;
        if self.len == 0 {
            self.tail = None;
        }

        Ok(Some(node.value))
    }

    /// Remove up to `count` values from the front
    ///
    /// Stops early, without error, once the deque runs dry. Values are
    /// returned front to back.
    ///
    /// # Errors
    ///
    /// Halts on the first [`Error::InvariantViolation`]; the values removed
    /// before it are returned inside the [`PopManyError`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linkdeque::LinkedDeque;
    ///
    /// let mut queue: LinkedDeque<_> = (1..=3).collect();
    /// assert_eq!(queue.pop_front_many(10).unwrap(), vec![1, 2, 3]);
    /// assert!(queue.is_empty());
    /// ```
    pub fn pop_front_many(&mut self, count: usize) -> core::result::Result<Vec<T>, PopManyError<T>> {
        let mut items = Vec::with_capacity(count.min(self.len));

        for _ in 0..count {
            match self.pop_front() {
                Ok(Some(value)) => items.push(value),
                Ok(None) => break,
                Err(source) => {
                    debug!(
                        target: LOG_TARGET,
                        completed = items.len(),
                        requested = count,
                        "bulk pop stopped early"
                    );
                    return Err(PopManyError { items, source });
                }
            }
        }

        Ok(items)
    }

    /// Reference to the front value
    pub fn front(&self) -> Option<&T> {
        // SAFETY: nodes reachable from `head` are alive while `self` is borrowed.
        self.head.map(|node| unsafe { &(*node.as_ptr()).value })
    }

    /// Mutable reference to the front value
    pub fn front_mut(&mut self) -> Option<&mut T> {
        // SAFETY: as in `front`, and `&mut self` makes the borrow unique.
        self.head.map(|node| unsafe { &mut (*node.as_ptr()).value })
    }

    /// Reference to the back value
    pub fn back(&self) -> Option<&T> {
        // SAFETY: `tail` points into the chain whenever it is set.
        self.tail.map(|node| unsafe { &(*node.as_ptr()).value })
    }

    /// Mutable reference to the back value
    pub fn back_mut(&mut self) -> Option<&mut T> {
        // SAFETY: as in `back`, and `&mut self` makes the borrow unique.
        self.tail.map(|node| unsafe { &mut (*node.as_ptr()).value })
    }

    /// Drop every element
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Front-to-back iterator over references
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head,
            remaining: self.len,
            marker: PhantomData,
        }
    }

    /// Front-to-back iterator over mutable references
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            next: self.head,
            remaining: self.len,
            marker: PhantomData,
        }
    }

    /// Head/tail consistency check run before every insertion
    fn check_ends(&self) -> Result<()> {
        match (self.head, self.tail) {
            (None, None) if self.len == 0 => Ok(()),
            (Some(_), Some(tail)) if self.len > 0 => {
                // SAFETY: `tail` points into the chain whenever it is set.
                if unsafe { tail.as_ref() }.next.is_some() {
                    Err(self.violation("tail node has a successor"))
                } else {
                    Ok(())
                }
            }
            (Some(_), None) => Err(self.violation("head is present but tail is missing")),
            (None, Some(_)) => Err(self.violation("tail is present but head is missing")),
            _ => Err(self.violation("length disagrees with endpoints")),
        }
    }

    /// Attach a detached node after the current tail
    fn link_back(&mut self, node: NonNull<Node<T>>) {
        match self.tail {
            // SAFETY: `tail` is the last live node and `&mut self` is unique.
            Some(tail) => unsafe { (*tail.as_ptr()).next = Some(node) },
            None => self.head = Some(node),
        }
        self.tail = Some(node);
        self.len += 1;
    }

    fn push_each<I>(
        &mut self,
        items: I,
        push: fn(&mut Self, T) -> Result<()>,
    ) -> core::result::Result<usize, BulkError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut completed = 0;
        for item in items {
            if let Err(source) = push(self, item) {
                debug!(target: LOG_TARGET, completed, "bulk push stopped early");
                return Err(BulkError { completed, source });
            }
            completed += 1;
        }
        Ok(completed)
    }

    fn violation(&self, reason: &'static str) -> Error {
        warn!(target: LOG_TARGET, reason, len = self.len, "deque invariant violated");
        Error::invariant(reason)
    }
}

#[cfg(test)]
impl<T> LinkedDeque<T> {
    /// Forget the tail reference while keeping the chain reachable from head
    pub(crate) fn corrupt_forget_tail(&mut self) {
        self.tail = None;
    }

    /// Point the tail back at the head node
    pub(crate) fn corrupt_tail_to_head(&mut self) {
        self.tail = self.head;
    }

    /// Overwrite the element count
    pub(crate) fn corrupt_len(&mut self, len: usize) {
        self.len = len;
    }

    /// Walk the chain and check every structural invariant
    pub(crate) fn assert_consistent(&self) {
        match self.len {
            0 => {
                assert!(self.head.is_none(), "empty deque still has a head");
                assert!(self.tail.is_none(), "empty deque still has a tail");
            }
            1 => assert_eq!(self.head, self.tail, "single node must be head and tail"),
            _ => assert_ne!(self.head, self.tail, "head and tail must differ"),
        }

        let mut steps = 0;
        let mut cursor = self.head;
        let mut last = None;
        while let Some(node) = cursor {
            last = Some(node);
            // SAFETY: every node reachable from head is alive.
            cursor = unsafe { node.as_ref() }.next;
            steps += 1;
        }
        assert_eq!(steps, self.len, "chain length disagrees with count");
        assert_eq!(last, self.tail, "chain does not end at the tail");
    }
}

impl<T> Drop for LinkedDeque<T> {
    fn drop(&mut self) {
        // Iterative so that long chains cannot overflow the stack
        let mut cursor = self.head.take();
        while let Some(node) = cursor {
            // SAFETY: each node is owned by exactly one link and freed once.
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            cursor = node.next;
        }
        self.tail = None;
        self.len = 0;
    }
}

impl<T> Default for LinkedDeque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkedDeque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

impl<T: Clone> Clone for LinkedDeque<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for LinkedDeque<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for LinkedDeque<T> {}

impl<T> Extend<T> for LinkedDeque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        debug_assert!(self.check_ends().is_ok());
        for value in iter {
            self.link_back(Node::alloc(value));
        }
    }
}

impl<T> FromIterator<T> for LinkedDeque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

impl<T> IntoIterator for LinkedDeque<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { deque: self }
    }
}

impl<'a, T> IntoIterator for &'a LinkedDeque<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut LinkedDeque<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

/// Borrowing iterator returned by [`LinkedDeque::iter`]
pub struct Iter<'a, T> {
    next: Option<NonNull<Node<T>>>,
    remaining: usize,
    marker: PhantomData<&'a Node<T>>,
}

// SAFETY: behaves like `&'a T`.
unsafe impl<T: Sync> Send for Iter<'_, T> {}
// SAFETY: behaves like `&'a T`.
unsafe impl<T: Sync> Sync for Iter<'_, T> {}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.next.map(|node| {
            // SAFETY: the deque is borrowed for `'a`, keeping every node alive.
            let node = unsafe { &*node.as_ptr() };
            self.next = node.next;
            self.remaining -= 1;
            &node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            next: self.next,
            remaining: self.remaining,
            marker: PhantomData,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Mutable borrowing iterator returned by [`LinkedDeque::iter_mut`]
pub struct IterMut<'a, T> {
    next: Option<NonNull<Node<T>>>,
    remaining: usize,
    marker: PhantomData<&'a mut Node<T>>,
}

// SAFETY: behaves like `&'a mut T`.
unsafe impl<T: Send> Send for IterMut<'_, T> {}
// SAFETY: behaves like `&'a mut T`.
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        self.next.map(|node| {
            // SAFETY: the deque is mutably borrowed for `'a` and each node is
            // yielded at most once.
            let node = unsafe { &mut *node.as_ptr() };
            self.next = node.next;
            self.remaining -= 1;
            &mut node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

impl<T> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("remaining", &self.remaining)
            .finish()
    }
}

/// Owning iterator that pops from the front
pub struct IntoIter<T> {
    deque: LinkedDeque<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self.deque.pop_front() {
            Ok(value) => value,
            Err(_) => {
                // `pop_front` already logged the violation; drop what is left
                // so the iterator stays fused and its length exact.
                debug!(target: LOG_TARGET, remaining = self.deque.len, "owning iterator stopped early");
                self.deque.clear();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.deque.len, Some(self.deque.len))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.deque).finish()
    }
}
