//! Node pools for one family of trees.
//!
//! A `NodePools` bundles one `ObjectPool` per node type. It is cheap to clone
//! (three `Arc`s) and every node keeps its own pool alive, so trees may
//! outlive the bundle that built them.

use std::sync::Arc;

use arbor_core::alloc::{ObjectPool, StatsSnapshot, StrategyKind};
use arbor_core::AllocError;

use super::{Array, Element, Object, Value};

#[derive(Clone)]
pub struct NodePools {
    values: Arc<ObjectPool<Value>>,
    arrays: Arc<ObjectPool<Array>>,
    objects: Arc<ObjectPool<Object>>,
}

/// Allocation counters of each pool in a `NodePools`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub values: StatsSnapshot,
    pub arrays: StatsSnapshot,
    pub objects: StatsSnapshot,
}

impl PoolStats {
    /// Nodes of any type currently alive.
    pub fn live(&self) -> usize {
        self.values.live() + self.arrays.live() + self.objects.live()
    }

    pub fn allocations(&self) -> usize {
        self.values.allocations + self.arrays.allocations + self.objects.allocations
    }
}

impl NodePools {
    pub fn new(kind: StrategyKind) -> Result<Self, AllocError> {
        Ok(Self {
            values: ObjectPool::new(kind)?,
            arrays: ObjectPool::new(kind)?,
            objects: ObjectPool::new(kind)?,
        })
    }

    pub fn value(&self, value: impl Into<Value>) -> Element {
        Element::Value(self.values.alloc(value.into()))
    }

    pub fn null(&self) -> Element {
        self.value(Value::Null)
    }

    /// A new, empty array node.
    pub fn array(&self) -> Element {
        self.array_from(Array::new())
    }

    pub fn array_from(&self, array: Array) -> Element {
        Element::Array(self.arrays.alloc(array))
    }

    /// A new, empty object node.
    pub fn object(&self) -> Element {
        self.object_from(Object::new())
    }

    pub fn object_from(&self, object: Object) -> Element {
        Element::Object(self.objects.alloc(object))
    }

    /// Name of the allocator strategy shared by the three pools.
    pub fn strategy_name(&self) -> &'static str {
        self.values.strategy_name()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            values: self.values.stats(),
            arrays: self.arrays.stats(),
            objects: self.objects.stats(),
        }
    }
}

impl std::fmt::Debug for NodePools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodePools")
            .field("strategy", &self.strategy_name())
            .field("stats", &self.stats())
            .finish()
    }
}
