//! # arbor-core
//!
//! Foundation layer for the arbor JSON engine: node memory and the queues
//! that connect the lexer and parser threads.
//!
//! ### Key Submodules:
//! - `alloc`: allocator strategies (direct, free-list, slab) and typed object pools
//! - `sync`: blocking bounded channel and lock-free SPSC ring buffer
//!
//! Nothing in this crate knows about JSON; `arbor-json` builds on it.

pub mod alloc;
pub mod error;
pub mod sync;

pub mod prelude {
    pub use crate::alloc::*;
    pub use crate::error::*;
    pub use crate::sync::*;
}

pub use error::{AllocError, QueueError};
