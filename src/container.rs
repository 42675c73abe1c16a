use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use std::marker::PhantomData;

use parking_lot::{Condvar, Mutex};

use crate::trace::{debug, trace};

/// Error returned by [`Concurrent::try_pop_into`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopError {
    /// The container held no elements when it was locked
    Empty,
}

impl fmt::Display for PopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "container is empty"),
        }
    }
}

impl Error for PopError {}

/// Removal policy of a [`Concurrent`] container.
///
/// Elements always enter at the back of the underlying sequence; the
/// discipline decides which end they leave from.
pub trait Discipline {
    /// Short name used in `Debug` output and trace events
    const NAME: &'static str;

    /// Removes the next element according to this policy, or `None` if the
    /// sequence is empty.
    fn take<T>(elements: &mut VecDeque<T>) -> Option<T>;
}

/// A thread-safe container guarded by a single mutex, with a condition
/// variable for consumers waiting on an empty container.
///
/// Use it through the [`ConcurrentQueue`](crate::ConcurrentQueue) and
/// [`ConcurrentStack`](crate::ConcurrentStack) aliases. All operations take
/// `&self`, so one instance is shared between threads with an
/// [`Arc`](std::sync::Arc).
///
/// # Type Parameters
///
/// * `T`: The element type. The container is `Send + Sync` when `T: Send`
/// * `D`: The [`Discipline`] deciding which element is removed next
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use threadsafe_containers::ConcurrentQueue;
///
/// let queue = Arc::new(ConcurrentQueue::new());
/// let consumer = {
///     let queue = Arc::clone(&queue);
///     thread::spawn(move || queue.wait_and_pop())
/// };
/// queue.push("job");
/// assert_eq!(consumer.join().unwrap(), "job");
/// ```
pub struct Concurrent<T, D> {
    elements: Mutex<VecDeque<T>>,
    available: Condvar,
    discipline: PhantomData<fn() -> D>,
}

impl<T, D: Discipline> Concurrent<T, D> {
    /// Creates a new empty container.
    ///
    /// # Examples
    /// ```
    /// use threadsafe_containers::ConcurrentStack;
    /// let stack: ConcurrentStack<i32> = ConcurrentStack::new();
    /// assert!(stack.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_elements(VecDeque::new())
    }

    fn with_elements(elements: VecDeque<T>) -> Self {
        Self {
            elements: Mutex::new(elements),
            available: Condvar::new(),
            discipline: PhantomData,
        }
    }

    /// Inserts a value and wakes one thread blocked in
    /// [`wait_and_pop`](Self::wait_and_pop), if any.
    ///
    /// Never fails. The lock is released before the waiter is signalled.
    pub fn push(&self, value: T) {
        let mut elements = self.elements.lock();
        elements.push_back(value);
        trace!(discipline = D::NAME, len = elements.len(), "pushed");
        drop(elements);
        self.available.notify_one();
    }

    /// Removes and returns the next element, blocking the calling thread
    /// while the container is empty.
    ///
    /// The emptiness check is repeated after every wake-up, so spurious
    /// wake-ups and values taken by a faster consumer simply put the thread
    /// back to sleep. There is no timeout: if no thread ever pushes, this
    /// call never returns.
    ///
    /// # Examples
    /// ```
    /// use threadsafe_containers::ConcurrentQueue;
    /// let queue = ConcurrentQueue::new();
    /// queue.push(1);
    /// queue.push(2);
    /// assert_eq!(queue.wait_and_pop(), 1);
    /// assert_eq!(queue.wait_and_pop(), 2);
    /// ```
    pub fn wait_and_pop(&self) -> T {
        let mut elements = self.elements.lock();
        loop {
            if let Some(value) = D::take(&mut *elements) {
                trace!(discipline = D::NAME, len = elements.len(), "popped");
                return value;
            }
            debug!(discipline = D::NAME, "empty, waiting for a push");
            self.available.wait(&mut elements);
            debug!(discipline = D::NAME, "woken");
        }
    }

    /// Blocking pop that writes the removed element into `slot`.
    pub fn wait_and_pop_into(&self, slot: &mut T) {
        *slot = self.wait_and_pop();
    }

    /// Removes and returns the next element, or `None` immediately if the
    /// container is empty. Never blocks beyond acquiring the lock.
    ///
    /// # Examples
    /// ```
    /// use threadsafe_containers::ConcurrentStack;
    /// let stack = ConcurrentStack::new();
    /// assert_eq!(stack.try_pop(), None);
    /// stack.push(42);
    /// assert_eq!(stack.try_pop(), Some(42));
    /// ```
    pub fn try_pop(&self) -> Option<T> {
        let mut elements = self.elements.lock();
        let value = D::take(&mut *elements);
        trace!(
            discipline = D::NAME,
            hit = value.is_some(),
            len = elements.len(),
            "try_pop"
        );
        value
    }

    /// Non-blocking pop that writes the removed element into `slot`.
    ///
    /// On `Err(PopError::Empty)` the slot is left untouched.
    ///
    /// # Examples
    /// ```
    /// use threadsafe_containers::{ConcurrentQueue, PopError};
    /// let queue = ConcurrentQueue::new();
    /// let mut slot = 0;
    /// assert_eq!(queue.try_pop_into(&mut slot), Err(PopError::Empty));
    /// queue.push(5);
    /// assert_eq!(queue.try_pop_into(&mut slot), Ok(()));
    /// assert_eq!(slot, 5);
    /// ```
    pub fn try_pop_into(&self, slot: &mut T) -> Result<(), PopError> {
        *slot = self.try_pop().ok_or(PopError::Empty)?;
        Ok(())
    }

    /// Returns true if the container is empty.
    ///
    /// Note: the answer is a snapshot; other threads may push or pop before
    /// the caller acts on it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.lock().is_empty()
    }

    /// Returns the number of elements currently held.
    ///
    /// Note: like [`is_empty`](Self::is_empty), this may be stale as soon
    /// as it returns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.lock().len()
    }
}

impl<T, D: Discipline> Default for Concurrent<T, D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot copy: the source is locked while its elements are cloned, and
/// the new container starts with its own lock and no waiters.
impl<T: Clone, D: Discipline> Clone for Concurrent<T, D> {
    fn clone(&self) -> Self {
        let snapshot = self.elements.lock().clone();
        Self::with_elements(snapshot)
    }
}

impl<T: fmt::Debug, D: Discipline> fmt::Debug for Concurrent<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elements = self.elements.lock();
        f.debug_struct("Concurrent")
            .field("discipline", &D::NAME)
            .field("elements", &*elements)
            .finish()
    }
}
