//! ## arbor-core::alloc::strategy
//! **Raw slot providers**
//!
//! A strategy is bound to one slot layout at construction and hands out
//! uninitialized slots of exactly that layout. It never sees the values
//! stored in them; `ObjectPool` is responsible for construction and drop.

use std::alloc::{self, Layout};
use std::mem;
use std::ptr::NonNull;

use bumpalo::Bump;
use tracing::trace;

use super::stats::MemoryStats;
use crate::error::AllocError;

/// A provider of raw, uninitialized slots of one fixed layout.
pub trait AllocStrategy: Send {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Layout of every slot handed out by this strategy.
    fn layout(&self) -> Layout;

    /// Hands out one uninitialized slot.
    fn allocate(&mut self) -> Result<NonNull<u8>, AllocError>;

    /// Takes a slot back.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this same strategy,
    /// must not have been deallocated already, and must not be used afterwards.
    /// Any value stored in the slot must already have been dropped.
    unsafe fn deallocate(&mut self, ptr: NonNull<u8>);

    fn stats(&self) -> &MemoryStats;
}

/// Selects and builds one of the built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Direct,
    FreeList,
    Slab { slots_per_block: usize },
}

impl StrategyKind {
    pub const DEFAULT_SLAB_SLOTS: usize = 256;

    pub fn build(self, layout: Layout) -> Result<Box<dyn AllocStrategy>, AllocError> {
        Ok(match self {
            StrategyKind::Direct => Box::new(DirectStrategy::new(layout)?),
            StrategyKind::FreeList => Box::new(FreeListStrategy::new(layout)?),
            StrategyKind::Slab { slots_per_block } => {
                Box::new(SlabStrategy::new(layout, slots_per_block)?)
            }
        })
    }
}

impl Default for StrategyKind {
    fn default() -> Self {
        StrategyKind::Slab {
            slots_per_block: Self::DEFAULT_SLAB_SLOTS,
        }
    }
}

fn checked_slot(layout: Layout) -> Result<Layout, AllocError> {
    if layout.size() == 0 {
        return Err(AllocError::InvalidLayout(
            "zero-sized slots are not supported".into(),
        ));
    }
    Ok(layout.pad_to_align())
}

fn system_alloc(layout: Layout) -> Result<NonNull<u8>, AllocError> {
    // SAFETY: callers only pass layouts with a non-zero size.
    let raw = unsafe { alloc::alloc(layout) };
    NonNull::new(raw).ok_or(AllocError::OutOfMemory {
        size: layout.size(),
        align: layout.align(),
    })
}

/// Delegates every call to the system allocator.
pub struct DirectStrategy {
    layout: Layout,
    stats: MemoryStats,
}

impl DirectStrategy {
    pub fn new(layout: Layout) -> Result<Self, AllocError> {
        Ok(Self {
            layout: checked_slot(layout)?,
            stats: MemoryStats::new(),
        })
    }
}

impl AllocStrategy for DirectStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    fn allocate(&mut self) -> Result<NonNull<u8>, AllocError> {
        let ptr = system_alloc(self.layout)?;
        self.stats.record_system_allocation();
        self.stats.record_allocation();
        Ok(ptr)
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<u8>) {
        // SAFETY: the caller guarantees `ptr` came from `allocate`, which used `self.layout`.
        unsafe { alloc::dealloc(ptr.as_ptr(), self.layout) };
        self.stats.record_release();
    }

    fn stats(&self) -> &MemoryStats {
        &self.stats
    }
}

/// Header written into a released slot while it sits on the free list.
struct FreeNode {
    next: Option<NonNull<FreeNode>>,
}

/// Recycles released slots through an intrusive singly-linked list.
///
/// Release is an O(1) prepend; allocation pops the head and only reaches the
/// system allocator when the list is empty.
pub struct FreeListStrategy {
    layout: Layout,
    head: Option<NonNull<FreeNode>>,
    cached: usize,
    stats: MemoryStats,
}

// SAFETY: the list nodes are slots owned exclusively by this strategy.
unsafe impl Send for FreeListStrategy {}

impl FreeListStrategy {
    pub fn new(layout: Layout) -> Result<Self, AllocError> {
        let layout = checked_slot(layout)?;
        // Slots must be able to hold the list header once released.
        let size = layout.size().max(mem::size_of::<FreeNode>());
        let align = layout.align().max(mem::align_of::<FreeNode>());
        let layout = Layout::from_size_align(size, align)
            .map_err(|e| AllocError::InvalidLayout(e.to_string()))?
            .pad_to_align();

        Ok(Self {
            layout,
            head: None,
            cached: 0,
            stats: MemoryStats::new(),
        })
    }

    /// Number of released slots waiting on the free list.
    pub fn cached_slots(&self) -> usize {
        self.cached
    }
}

impl AllocStrategy for FreeListStrategy {
    fn name(&self) -> &'static str {
        "free_list"
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    fn allocate(&mut self) -> Result<NonNull<u8>, AllocError> {
        if let Some(node) = self.head {
            // SAFETY: every node on the list was initialized by `deallocate`.
            self.head = unsafe { node.as_ref().next };
            self.cached -= 1;
            self.stats.record_recycled();
            self.stats.record_allocation();
            return Ok(node.cast());
        }

        let ptr = system_alloc(self.layout)?;
        self.stats.record_system_allocation();
        self.stats.record_allocation();
        Ok(ptr)
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<u8>) {
        let node = ptr.cast::<FreeNode>();
        // SAFETY: the slot is ours again, large and aligned enough for a `FreeNode`.
        unsafe { node.as_ptr().write(FreeNode { next: self.head }) };
        self.head = Some(node);
        self.cached += 1;
        self.stats.record_release();
    }

    fn stats(&self) -> &MemoryStats {
        &self.stats
    }
}

impl Drop for FreeListStrategy {
    fn drop(&mut self) {
        while let Some(node) = self.head {
            // SAFETY: list nodes are initialized headers inside slots from `system_alloc`.
            unsafe {
                self.head = node.as_ref().next;
                alloc::dealloc(node.as_ptr().cast(), self.layout);
            }
        }
    }
}

/// Carves fixed-size blocks of slots out of a `bumpalo` arena and hands them
/// out with a cursor.
///
/// Releasing a slot is a no-op; the arena returns every block to the system
/// when the strategy is dropped. Suited to build-then-discard trees.
pub struct SlabStrategy {
    arena: Bump,
    slot: Layout,
    block: Layout,
    slots_per_block: usize,
    blocks: usize,
    base: Option<NonNull<u8>>,
    cursor: usize,
    stats: MemoryStats,
}

// SAFETY: `base` points into `arena`, which moves with the strategy.
unsafe impl Send for SlabStrategy {}

impl SlabStrategy {
    pub fn new(layout: Layout, slots_per_block: usize) -> Result<Self, AllocError> {
        if slots_per_block == 0 {
            return Err(AllocError::InvalidLayout(
                "slab blocks need at least one slot".into(),
            ));
        }
        let slot = checked_slot(layout)?;
        let block_size = slot.size().checked_mul(slots_per_block).ok_or_else(|| {
            AllocError::InvalidLayout(format!(
                "{slots_per_block} slots of {} bytes overflow a block",
                slot.size()
            ))
        })?;
        let block = Layout::from_size_align(block_size, slot.align())
            .map_err(|e| AllocError::InvalidLayout(e.to_string()))?;

        Ok(Self {
            arena: Bump::new(),
            slot,
            block,
            slots_per_block,
            blocks: 0,
            base: None,
            cursor: 0,
            stats: MemoryStats::new(),
        })
    }

    /// Number of blocks reserved so far.
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn slots_per_block(&self) -> usize {
        self.slots_per_block
    }

    /// Bytes the arena has reserved from the system.
    pub fn reserved_bytes(&self) -> usize {
        self.arena.allocated_bytes()
    }

    fn reserve_block(&mut self) -> Result<NonNull<u8>, AllocError> {
        let block = self
            .arena
            .try_alloc_layout(self.block)
            .map_err(|_| AllocError::OutOfMemory {
                size: self.block.size(),
                align: self.block.align(),
            })?;
        self.blocks += 1;
        self.cursor = 0;
        self.stats.record_system_allocation();
        self.stats.record_block();
        trace!(
            blocks = self.blocks,
            bytes = self.block.size(),
            "slab block reserved"
        );
        Ok(block)
    }
}

impl AllocStrategy for SlabStrategy {
    fn name(&self) -> &'static str {
        "slab"
    }

    fn layout(&self) -> Layout {
        self.slot
    }

    fn allocate(&mut self) -> Result<NonNull<u8>, AllocError> {
        let base = match self.base {
            Some(base) if self.cursor < self.slots_per_block => base,
            _ => {
                let block = self.reserve_block()?;
                self.base = Some(block);
                block
            }
        };

        // SAFETY: `cursor < slots_per_block`, so the offset stays inside the block.
        let slot =
            unsafe { NonNull::new_unchecked(base.as_ptr().add(self.cursor * self.slot.size())) };
        self.cursor += 1;
        self.stats.record_allocation();
        Ok(slot)
    }

    unsafe fn deallocate(&mut self, _ptr: NonNull<u8>) {
        self.stats.record_release();
    }

    fn stats(&self) -> &MemoryStats {
        &self.stats
    }
}
