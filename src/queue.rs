use std::collections::VecDeque;

use crate::container::{Concurrent, Discipline};

/// First in, first out: elements leave in the order they were pushed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fifo;

impl Discipline for Fifo {
    const NAME: &'static str = "fifo";

    fn take<T>(elements: &mut VecDeque<T>) -> Option<T> {
        elements.pop_front()
    }
}

/// A thread-safe FIFO queue.
///
/// Values are pushed at the tail and removed from the head, either blocking
/// ([`wait_and_pop`](Concurrent::wait_and_pop)) or not
/// ([`try_pop`](Concurrent::try_pop)).
///
/// # Examples
/// ```
/// use threadsafe_containers::queue::ConcurrentQueue;
/// let queue = ConcurrentQueue::new();
/// queue.push('a');
/// queue.push('b');
/// assert_eq!(queue.try_pop(), Some('a'));
/// assert_eq!(queue.try_pop(), Some('b'));
/// assert_eq!(queue.try_pop(), None);
/// ```
pub type ConcurrentQueue<T> = Concurrent<T, Fifo>;
