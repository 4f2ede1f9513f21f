//! ## arbor-core::alloc::stats
//! **Allocation statistics and tracking**
//!
//! Every strategy owns one `MemoryStats`. Counters are atomic so a pool can
//! report them without taking its strategy lock.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Allocation counters for a single strategy.
#[derive(Debug)]
pub struct MemoryStats {
    allocations: AtomicUsize,
    releases: AtomicUsize,
    system_allocations: AtomicUsize,
    recycled: AtomicUsize,
    blocks: AtomicUsize,
}

/// Point-in-time copy of a `MemoryStats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Slots handed out.
    pub allocations: usize,
    /// Slots given back, including no-op releases of the slab strategy.
    pub releases: usize,
    /// Calls that reached the system allocator.
    pub system_allocations: usize,
    /// Slots served from a free list instead of the system allocator.
    pub recycled: usize,
    /// Bulk blocks reserved by the slab strategy.
    pub blocks: usize,
}

impl StatsSnapshot {
    /// Slots currently owned by live nodes.
    pub fn live(&self) -> usize {
        self.allocations.saturating_sub(self.releases)
    }
}

impl MemoryStats {
    /// Creates a new `MemoryStats` instance with all counters initialized to zero.
    pub fn new() -> Self {
        MemoryStats {
            allocations: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            system_allocations: AtomicUsize::new(0),
            recycled: AtomicUsize::new(0),
            blocks: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn record_allocation(&self) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_system_allocation(&self) {
        self.system_allocations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_recycled(&self) {
        self.recycled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_block(&self) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            allocations: self.allocations.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            system_allocations: self.system_allocations.load(Ordering::Relaxed),
            recycled: self.recycled.load(Ordering::Relaxed),
            blocks: self.blocks.load(Ordering::Relaxed),
        }
    }
}

impl Default for MemoryStats {
    fn default() -> Self {
        Self::new()
    }
}
