//! ## arbor-core::alloc::pool
//! **Typed object pools**
//!
//! An `ObjectPool<T>` binds one `AllocStrategy` to one node type. Values live
//! in pool slots behind a `PoolBox<T>`, which drops the value and hands the
//! slot back when it goes out of scope. Each `PoolBox` holds an `Arc` to its
//! pool, so a pool is released together with the last node it served.

use std::alloc::{handle_alloc_error, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::sync::Arc;

use parking_lot::Mutex;

use super::stats::StatsSnapshot;
use super::strategy::{AllocStrategy, StrategyKind};
use crate::error::AllocError;

/// A pool of slots for values of type `T`.
pub struct ObjectPool<T> {
    strategy: Mutex<Box<dyn AllocStrategy>>,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ObjectPool<T> {
    /// Creates a pool backed by one of the built-in strategies.
    pub fn new(kind: StrategyKind) -> Result<Arc<Self>, AllocError> {
        Self::with_strategy(kind.build(Layout::new::<T>())?)
    }

    /// Creates a pool around a caller-supplied strategy.
    ///
    /// Fails if the strategy's slots cannot hold a `T`.
    pub fn with_strategy(strategy: Box<dyn AllocStrategy>) -> Result<Arc<Self>, AllocError> {
        let slot = strategy.layout();
        let needed = Layout::new::<T>();
        if slot.size() < needed.size() || slot.align() < needed.align() {
            return Err(AllocError::InvalidLayout(format!(
                "{} slots of {} bytes (align {}) cannot hold {} bytes (align {})",
                strategy.name(),
                slot.size(),
                slot.align(),
                needed.size(),
                needed.align()
            )));
        }

        Ok(Arc::new(Self {
            name: strategy.name(),
            strategy: Mutex::new(strategy),
            _marker: PhantomData,
        }))
    }

    /// Moves `value` into a pool slot.
    ///
    /// Running out of memory is fatal and aborts through `handle_alloc_error`.
    pub fn alloc(self: &Arc<Self>, value: T) -> PoolBox<T> {
        match self.try_alloc(value) {
            Ok(boxed) => boxed,
            Err(_) => handle_alloc_error(Layout::new::<T>()),
        }
    }

    /// Moves `value` into a pool slot, surfacing allocation failure.
    pub fn try_alloc(self: &Arc<Self>, value: T) -> Result<PoolBox<T>, AllocError> {
        let slot = self.strategy.lock().allocate()?;
        let ptr = slot.cast::<T>();
        // SAFETY: the slot is fresh, sized and aligned for `T` (checked in `with_strategy`).
        unsafe { ptr.as_ptr().write(value) };
        Ok(PoolBox {
            ptr,
            pool: Arc::clone(self),
            _owns: PhantomData,
        })
    }

    /// Name of the strategy backing this pool.
    pub fn strategy_name(&self) -> &'static str {
        self.name
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.strategy.lock().stats().snapshot()
    }

    /// # Safety
    ///
    /// `ptr` must come from this pool and its value must already be dropped or moved out.
    unsafe fn release(&self, ptr: NonNull<T>) {
        // SAFETY: forwarded from the caller.
        unsafe { self.strategy.lock().deallocate(ptr.cast()) };
    }
}

impl<T> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("strategy", &self.name)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Owning pointer to a value stored in an `ObjectPool` slot.
pub struct PoolBox<T> {
    ptr: NonNull<T>,
    pool: Arc<ObjectPool<T>>,
    _owns: PhantomData<T>,
}

// SAFETY: a `PoolBox` owns its value exactly like `Box` does; the pool is internally locked.
unsafe impl<T: Send> Send for PoolBox<T> {}
unsafe impl<T: Sync> Sync for PoolBox<T> {}

impl<T> PoolBox<T> {
    /// The pool this value was allocated from.
    pub fn pool(this: &Self) -> &Arc<ObjectPool<T>> {
        &this.pool
    }

    /// Moves the value out and returns the slot to the pool.
    pub fn into_inner(this: Self) -> T {
        let this = mem::ManuallyDrop::new(this);
        // SAFETY: the value is initialized; `ManuallyDrop` stops a second drop.
        let value = unsafe { ptr::read(this.ptr.as_ptr()) };
        // SAFETY: the value has been moved out, so the slot is free.
        unsafe { this.pool.release(this.ptr) };
        // SAFETY: the `Arc` field is read exactly once and then dropped.
        drop(unsafe { ptr::read(&this.pool) });
        value
    }

    /// Address of the pooled value; identity for `ptr_eq` comparisons.
    pub fn as_ptr(this: &Self) -> *const T {
        this.ptr.as_ptr()
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        a.ptr == b.ptr
    }
}

impl<T> Deref for PoolBox<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the slot holds an initialized `T` for the whole life of the box.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> DerefMut for PoolBox<T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: as above, and `&mut self` guarantees exclusivity.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T> Drop for PoolBox<T> {
    fn drop(&mut self) {
        // SAFETY: the value is initialized and dropped exactly once, then the slot goes back.
        unsafe {
            ptr::drop_in_place(self.ptr.as_ptr());
            self.pool.release(self.ptr);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PoolBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
