use std::collections::btree_map;
use std::slice;
use std::sync::Arc;

use arbor_core::alloc::{ObjectPool, PoolBox};

use super::{Array, Object, Ref, Value};
use crate::error::{Error, Result};

/// Opaque identity of a live node.
///
/// Two ids are equal only if they were taken from the same node. Once a node
/// is released its id may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A node of a document tree.
///
/// Every variant owns its node through a pool slot; dropping an `Element`
/// releases it and all of its descendants.
#[derive(Debug)]
pub enum Element {
    Value(PoolBox<Value>),
    Array(PoolBox<Array>),
    Object(PoolBox<Object>),
}

impl Element {
    pub fn type_name(&self) -> &'static str {
        match self {
            Element::Value(v) => v.type_name(),
            Element::Array(_) => "array",
            Element::Object(_) => "object",
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Element::Value(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Element::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Element::Object(_))
    }

    pub fn as_value(&self) -> Result<&Value> {
        match self {
            Element::Value(v) => Ok(v),
            other => Err(Error::mismatch("value", other.type_name())),
        }
    }

    pub fn as_value_mut(&mut self) -> Result<&mut Value> {
        match self {
            Element::Value(v) => Ok(v),
            other => Err(Error::mismatch("value", other.type_name())),
        }
    }

    pub fn as_array(&self) -> Result<&Array> {
        match self {
            Element::Array(a) => Ok(a),
            other => Err(Error::mismatch("array", other.type_name())),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut Array> {
        match self {
            Element::Array(a) => Ok(a),
            other => Err(Error::mismatch("array", other.type_name())),
        }
    }

    pub fn as_object(&self) -> Result<&Object> {
        match self {
            Element::Object(o) => Ok(o),
            other => Err(Error::mismatch("object", other.type_name())),
        }
    }

    pub fn as_object_mut(&mut self) -> Result<&mut Object> {
        match self {
            Element::Object(o) => Ok(o),
            other => Err(Error::mismatch("object", other.type_name())),
        }
    }

    /// True only for a `null` value; containers are never null.
    pub fn is_null(&self) -> bool {
        matches!(self, Element::Value(v) if v.is_null())
    }

    pub fn as_bool(&self) -> Result<bool> {
        self.as_value()?.as_bool()
    }

    pub fn as_int(&self) -> Result<i32> {
        self.as_value()?.as_int()
    }

    pub fn as_float(&self) -> Result<f32> {
        self.as_value()?.as_float()
    }

    pub fn as_str(&self) -> Result<&str> {
        self.as_value()?.as_str()
    }

    /// Checked member lookup on an object.
    pub fn get(&self, key: &str) -> Result<&Element> {
        self.as_object()?.at(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut Element> {
        self.as_object_mut()?.at_mut(key)
    }

    /// Checked element access on an array.
    pub fn at(&self, index: usize) -> Result<&Element> {
        self.as_array()?.at(index)
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut Element> {
        self.as_array_mut()?.at_mut(index)
    }

    /// Number of children of a container; a scalar counts as one.
    pub fn len(&self) -> usize {
        match self {
            Element::Value(_) => 1,
            Element::Array(a) => a.len(),
            Element::Object(o) => o.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrowing navigator that tolerates absent members until read.
    pub fn cursor(&self) -> Ref<'_> {
        Ref::new(self)
    }

    /// Identity of this node, valid while the node is alive.
    pub fn node_id(&self) -> NodeId {
        let ptr = match self {
            Element::Value(v) => PoolBox::as_ptr(v).cast::<()>(),
            Element::Array(a) => PoolBox::as_ptr(a).cast::<()>(),
            Element::Object(o) => PoolBox::as_ptr(o).cast::<()>(),
        };
        NodeId(ptr as usize)
    }

    /// Identity comparison: both handles refer to the same node.
    pub fn same_node(&self, other: &Element) -> bool {
        self.node_id() == other.node_id()
    }

    /// Deep copy. Every node of the result comes from the same pool as its
    /// original and shares nothing with it.
    pub fn copy(&self) -> Element {
        let mut open = match CopyFrame::enter(self) {
            Copied::Leaf(leaf) => return leaf,
            Copied::Open(frame) => vec![frame],
        };
        loop {
            let top = open.len() - 1;
            match open[top].next_child() {
                Some(child) => match CopyFrame::enter(child) {
                    Copied::Leaf(leaf) => open[top].attach(leaf),
                    Copied::Open(frame) => open.push(frame),
                },
                None => {
                    let done = open.swap_remove(top).finish();
                    match open.last_mut() {
                        Some(parent) => parent.attach(done),
                        None => return done,
                    }
                }
            }
        }
    }

    /// Releases every child of a container. Scalars are left untouched.
    pub fn clear(&mut self) {
        match self {
            Element::Value(_) => {}
            Element::Array(a) => a.clear(),
            Element::Object(o) => o.clear(),
        }
    }
}

/// A container being copied: the source children still to visit and the
/// copy built so far.
enum CopyFrame<'a> {
    Array {
        source: slice::Iter<'a, Element>,
        pool: &'a Arc<ObjectPool<Array>>,
        built: Array,
    },
    Object {
        source: btree_map::Iter<'a, String, Element>,
        pool: &'a Arc<ObjectPool<Object>>,
        built: Object,
        key: &'a str,
    },
}

enum Copied<'a> {
    Leaf(Element),
    Open(CopyFrame<'a>),
}

impl<'a> CopyFrame<'a> {
    fn enter(element: &'a Element) -> Copied<'a> {
        match element {
            Element::Value(v) => {
                Copied::Leaf(Element::Value(PoolBox::pool(v).alloc((**v).clone())))
            }
            Element::Array(a) => Copied::Open(CopyFrame::Array {
                source: a.iter(),
                pool: PoolBox::pool(a),
                built: Array::with_capacity(a.len()),
            }),
            Element::Object(o) => Copied::Open(CopyFrame::Object {
                source: o.iter(),
                pool: PoolBox::pool(o),
                built: Object::new(),
                key: "",
            }),
        }
    }

    fn next_child(&mut self) -> Option<&'a Element> {
        match self {
            CopyFrame::Array { source, .. } => source.next(),
            CopyFrame::Object { source, key, .. } => source.next().map(|(name, value)| {
                *key = name.as_str();
                value
            }),
        }
    }

    fn attach(&mut self, element: Element) {
        match self {
            CopyFrame::Array { built, .. } => built.push(element),
            CopyFrame::Object { built, key, .. } => built.insert(*key, element),
        }
    }

    fn finish(self) -> Element {
        match self {
            CopyFrame::Array { pool, built, .. } => Element::Array(pool.alloc(built)),
            CopyFrame::Object { pool, built, .. } => Element::Object(pool.alloc(built)),
        }
    }
}

impl PartialEq for Element {
    /// Structural equality, walked with an explicit stack.
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            match (a, b) {
                (Element::Value(x), Element::Value(y)) => {
                    if **x != **y {
                        return false;
                    }
                }
                (Element::Array(x), Element::Array(y)) => {
                    if x.len() != y.len() {
                        return false;
                    }
                    pending.extend(x.iter().zip(y.iter()));
                }
                (Element::Object(x), Element::Object(y)) => {
                    if x.len() != y.len() {
                        return false;
                    }
                    for ((ka, va), (kb, vb)) in x.iter().zip(y.iter()) {
                        if ka != kb {
                            return false;
                        }
                        pending.push((va, vb));
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

/// Drops a set of nodes without recursing.
///
/// Each container is emptied onto the worklist before it is dropped, so the
/// node's own `Drop` only ever sees an empty container.
pub(crate) fn release_all(nodes: impl IntoIterator<Item = Element>) {
    let mut stack: Vec<Element> = nodes.into_iter().collect();
    while let Some(mut node) = stack.pop() {
        match &mut node {
            Element::Value(_) => {}
            Element::Array(a) => a.drain_into(&mut stack),
            Element::Object(o) => o.drain_into(&mut stack),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodePools;
    use arbor_core::alloc::StrategyKind;

    fn pools() -> NodePools {
        NodePools::new(StrategyKind::FreeList).unwrap()
    }

    #[test]
    fn checked_downcasts() {
        let pools = pools();
        let array = pools.array();
        assert!(array.is_array());
        assert!(!array.is_object());
        assert!(array.as_array().is_ok());
        assert!(matches!(
            array.as_object(),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(array.as_int(), Err(Error::TypeMismatch { .. })));
        assert!(matches!(array.get("k"), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn copy_is_independent() {
        let pools = pools();
        let mut root = pools.object();
        {
            let obj = root.as_object_mut().unwrap();
            obj.insert_value(&pools, "n", 1);
            let mut list = pools.array();
            list.as_array_mut().unwrap().push_value(&pools, "x");
            obj.insert("list", list);
        }

        let mut copy = root.copy();
        assert_eq!(copy, root);
        assert!(!copy.same_node(&root));

        copy.get_mut("list")
            .unwrap()
            .as_array_mut()
            .unwrap()
            .push_value(&pools, 2);
        assert_ne!(copy, root);
        assert_eq!(root.get("list").unwrap().len(), 1);
    }

    #[test]
    fn clear_releases_descendants() {
        let pools = pools();
        let mut root = pools.array();
        for i in 0..10 {
            let mut inner = pools.array();
            inner.as_array_mut().unwrap().push_value(&pools, i);
            root.as_array_mut().unwrap().push(inner);
        }
        assert_eq!(pools.stats().live(), 21);
        root.clear();
        assert_eq!(root.len(), 0);
        assert_eq!(pools.stats().live(), 1);
    }

    #[test]
    fn deep_tree_teardown_is_iterative() {
        let pools = pools();
        let mut root = pools.array();
        for _ in 0..100_000 {
            let mut outer = pools.array();
            outer.as_array_mut().unwrap().push(root);
            root = outer;
        }
        assert_eq!(pools.stats().live(), 100_001);
        drop(root);
        assert_eq!(pools.stats().live(), 0);
    }

    fn deep_arrays(pools: &NodePools, depth: usize) -> Element {
        let mut root = pools.array();
        root.as_array_mut().unwrap().push_value(pools, "leaf");
        for _ in 0..depth {
            let mut outer = pools.array();
            outer.as_array_mut().unwrap().push(root);
            root = outer;
        }
        root
    }

    #[test]
    fn deep_tree_copy_is_iterative() {
        let pools = pools();
        let root = deep_arrays(&pools, 100_000);
        let copy = root.copy();
        assert_eq!(pools.stats().live(), 2 * 100_002);
        assert!(copy == root);

        let mut node = &copy;
        while let Ok(child) = node.at(0) {
            node = child;
        }
        assert_eq!(node.as_str().unwrap(), "leaf");
        drop((root, copy));
        assert_eq!(pools.stats().live(), 0);
    }

    #[test]
    fn copy_keeps_object_keys() {
        let pools = pools();
        let mut root = pools.object();
        let mut inner = pools.object();
        inner.as_object_mut().unwrap().insert_value(&pools, "z", 1);
        inner.as_object_mut().unwrap().insert_value(&pools, "a", ());
        root.as_object_mut().unwrap().insert("nested", inner);
        root.as_object_mut().unwrap().insert("empty", pools.array());

        let copy = root.copy();
        assert_eq!(copy, root);
        assert_eq!(copy.get("nested").unwrap().get("z").unwrap().as_int().unwrap(), 1);
        assert!(copy.get("nested").unwrap().get("a").unwrap().is_null());
        assert!(copy.get("empty").unwrap().is_empty());
    }

    #[test]
    fn equality_is_structural() {
        let pools = pools();
        assert_eq!(pools.value(1), pools.value(1));
        assert_ne!(pools.value(1), pools.value(1.0f32));
        assert_ne!(pools.array(), pools.object());
        assert_eq!(pools.array(), pools.array());
    }
}
