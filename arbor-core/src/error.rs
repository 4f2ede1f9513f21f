use thiserror::Error;

/// Failures raised by allocator strategies and object pools.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("out of memory allocating {size} bytes (align {align})")]
    OutOfMemory { size: usize, align: usize },

    #[error("invalid slot layout: {0}")]
    InvalidLayout(String),
}

/// Failures raised when constructing queues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("invalid queue capacity {0} (must be a power of two, at least 2)")]
    InvalidCapacity(usize),
}
