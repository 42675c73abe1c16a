use std::collections::VecDeque;

use crate::container::{Concurrent, Discipline};

/// Last in, first out: the most recently pushed element leaves first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifo;

impl Discipline for Lifo {
    const NAME: &'static str = "lifo";

    fn take<T>(elements: &mut VecDeque<T>) -> Option<T> {
        elements.pop_back()
    }
}

/// A thread-safe LIFO stack.
///
/// Shares its whole API with [`ConcurrentQueue`](crate::ConcurrentQueue);
/// only the removal end differs.
///
/// # Examples
/// ```
/// use threadsafe_containers::ConcurrentStack;
///
/// let stack = ConcurrentStack::new();
/// stack.push(1);
/// stack.push(2);
/// assert_eq!(stack.try_pop(), Some(2));
/// assert_eq!(stack.wait_and_pop(), 1);
/// ```
pub type ConcurrentStack<T> = Concurrent<T, Lifo>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_stack_basic_operations() {
        let stack = ConcurrentStack::new();
        assert!(stack.is_empty());

        stack.push(1);
        stack.push(2);
        stack.push(3);

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.try_pop(), Some(3));
        assert_eq!(stack.try_pop(), Some(2));
        assert_eq!(stack.try_pop(), Some(1));
        assert_eq!(stack.try_pop(), None);
    }

    #[test]
    fn test_try_pop_reports_empty_not_default() {
        let stack: ConcurrentStack<u32> = ConcurrentStack::new();
        assert_eq!(stack.try_pop(), None);
        stack.push(0);
        assert_eq!(stack.try_pop(), Some(0));
        assert_eq!(stack.try_pop(), None);
    }

    #[test]
    fn test_clone_snapshot_keeps_top() {
        let stack = ConcurrentStack::new();
        stack.push("bottom");
        stack.push("top");

        let copy = stack.clone();
        assert_eq!(stack.try_pop(), Some("top"));
        assert_eq!(copy.try_pop(), Some("top"));
        assert_eq!(copy.try_pop(), Some("bottom"));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_wait_and_pop_blocks_until_push() {
        let stack = Arc::new(ConcurrentStack::new());
        let consumer = {
            let stack = Arc::clone(&stack);
            thread::spawn(move || {
                let mut slot = 0;
                stack.wait_and_pop_into(&mut slot);
                slot
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!consumer.is_finished());

        stack.push(13);
        assert_eq!(consumer.join().unwrap(), 13);
    }

    #[test]
    fn test_stack_concurrent_operations() {
        let stack = Arc::new(ConcurrentStack::new());
        let mut handles = vec![];

        for i in 0..200 {
            let stack = Arc::clone(&stack);
            handles.push(thread::spawn(move || {
                stack.push(i);
            }));
        }

        // Fewer poppers than pushes, so every blocking pop is eventually served
        for _ in 0..100 {
            let stack = Arc::clone(&stack);
            handles.push(thread::spawn(move || {
                stack.wait_and_pop();
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stack.len(), 100);
    }

    #[test]
    fn test_stack_concurrent_mixed_operations() {
        let stack = Arc::new(ConcurrentStack::new());

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let stack = Arc::clone(&stack);
                thread::spawn(move || {
                    let mut popped: usize = 0;
                    for j in 0..100 {
                        if j % 2 == 0 {
                            stack.push(i * 100 + j);
                        } else if stack.try_pop().is_some() {
                            popped += 1;
                        }
                    }
                    popped
                })
            })
            .collect();

        let popped: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(stack.len() + popped, 10 * 50);
    }
}
