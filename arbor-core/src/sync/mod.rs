//! ## arbor-core::sync
//! **Queues that decouple a producer thread from a consumer thread**
//!
//! - `channel/`: blocking FIFO on one mutex and two condition variables,
//!   bounded or unbounded, any number of producers and consumers, explicit close
//! - `ring/`: lock-free single-producer/single-consumer ring buffer with
//!   non-blocking push/pop; callers retry on full or empty

pub mod channel;
pub mod ring;

pub use channel::{Channel, Closed};
pub use ring::{Consumer, Producer, RingBuffer};
