//! Chained, borrowing navigation over a tree.
//!
//! ```
//! # fn main() -> arbor_json::Result<()> {
//! let root = arbor_json::parse(r#"{"c":{"d":true}}"#)?;
//! assert!(root.cursor().key("c")?.key("d")?.as_bool()?);
//! assert!(root.cursor().key("x")?.is_absent());
//! # Ok(())
//! # }
//! ```

use super::Element;
use crate::error::{Error, Result};

/// A borrowed position in a tree, possibly pointing at nothing.
///
/// Looking up a missing key yields an absent `Ref`; any further step or
/// read on it fails with `Error::NullReference`. A `Ref` never owns nodes.
#[derive(Debug, Clone, Copy)]
pub struct Ref<'a> {
    node: Option<&'a Element>,
}

impl<'a> Ref<'a> {
    pub fn new(node: &'a Element) -> Self {
        Self { node: Some(node) }
    }

    /// Steps into an object member. A missing key gives an absent `Ref`.
    pub fn key(self, key: &str) -> Result<Ref<'a>> {
        let object = self.element()?.as_object()?;
        Ok(Ref {
            node: object.get(key),
        })
    }

    /// Steps into an array item, bounds-checked.
    pub fn index(self, index: usize) -> Result<Ref<'a>> {
        Ok(Ref::new(self.element()?.at(index)?))
    }

    pub fn is_absent(&self) -> bool {
        self.node.is_none()
    }

    pub fn element(&self) -> Result<&'a Element> {
        self.node
            .ok_or_else(|| Error::NullReference("element is absent".into()))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.element()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.element()?.is_empty())
    }

    pub fn is_null(&self) -> bool {
        self.node.is_some_and(Element::is_null)
    }

    pub fn as_bool(&self) -> Result<bool> {
        self.element()?.as_bool()
    }

    pub fn as_int(&self) -> Result<i32> {
        self.element()?.as_int()
    }

    pub fn as_float(&self) -> Result<f32> {
        self.element()?.as_float()
    }

    pub fn as_str(&self) -> Result<&'a str> {
        self.element()?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodePools;
    use arbor_core::alloc::StrategyKind;

    #[test]
    fn absent_members_fail_on_use() {
        let pools = NodePools::new(StrategyKind::Direct).unwrap();
        let mut root = pools.object();
        root.as_object_mut().unwrap().insert_value(&pools, "a", 1);

        let cursor = root.cursor();
        assert_eq!(cursor.key("a").unwrap().as_int().unwrap(), 1);

        let missing = cursor.key("b").unwrap();
        assert!(missing.is_absent());
        assert!(!missing.is_null());
        assert!(matches!(missing.as_int(), Err(Error::NullReference(_))));
        assert!(matches!(missing.key("c"), Err(Error::NullReference(_))));
        assert!(matches!(cursor.index(0), Err(Error::TypeMismatch { .. })));
    }
}
