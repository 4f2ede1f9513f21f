//! ## arbor-core::alloc
//! **Allocator strategies and typed object pools for tree nodes**
//!
//! A parse allocates one node per JSON leaf or container. Routing those
//! allocations through a pool decouples them from the general-purpose
//! allocator and lets a caller pick the trade-off per workload.
//!
//! ### Key Submodules:
//! - `strategy/`: raw slot providers (`DirectStrategy`, `FreeListStrategy`, `SlabStrategy`)
//! - `pool/`: `ObjectPool<T>` binding one strategy to one node type, and the `PoolBox<T>` handle
//! - `stats/`: allocation counters shared by every strategy

pub mod pool;
pub mod stats;
pub mod strategy;

pub use pool::{ObjectPool, PoolBox};
pub use stats::{MemoryStats, StatsSnapshot};
pub use strategy::{AllocStrategy, DirectStrategy, FreeListStrategy, SlabStrategy, StrategyKind};
