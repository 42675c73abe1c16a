//! Thread-safe FIFO queue and LIFO stack for handing values between
//! producer and consumer threads.
//!
//! Both containers guard their elements with one mutex and park consumers
//! on a condition variable while empty. Share an instance between threads
//! with an [`Arc`](std::sync::Arc); every operation takes `&self`.

pub mod container;
pub mod queue;
pub mod stack;
pub mod trace;

pub use container::{Concurrent, Discipline, PopError};
pub use queue::{ConcurrentQueue, Fifo};
pub use stack::{ConcurrentStack, Lifo};
pub use trace::init_tracing;
