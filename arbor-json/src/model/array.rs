use std::mem;
use std::slice;

use super::element::release_all;
use super::{Element, NodeId, NodePools, Value};
use crate::error::{Error, Result};

/// Ordered sequence of owned elements.
#[derive(Debug, Default, PartialEq)]
pub struct Array {
    items: Vec<Element>,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Unchecked access: `None` past the end.
    pub fn get(&self, index: usize) -> Option<&Element> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.items.get_mut(index)
    }

    /// Bounds-checked access.
    pub fn at(&self, index: usize) -> Result<&Element> {
        let len = self.items.len();
        self.items
            .get(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut Element> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    pub fn push(&mut self, element: Element) {
        self.items.push(element);
    }

    /// Appends a new scalar allocated from `pools`.
    pub fn push_value(&mut self, pools: &NodePools, value: impl Into<Value>) {
        self.push(pools.value(value));
    }

    /// Inserts before `index`; `index == len` appends.
    pub fn insert(&mut self, index: usize, element: Element) -> Result<()> {
        let len = self.items.len();
        if index > len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        self.items.insert(index, element);
        Ok(())
    }

    /// Overwrites the element at `index`, releasing the previous one.
    pub fn set(&mut self, index: usize, element: Element) -> Result<()> {
        let slot = self.at_mut(index)?;
        let previous = mem::replace(slot, element);
        release_all([previous]);
        Ok(())
    }

    /// Removes the element at `index` and hands it back to the caller.
    pub fn erase(&mut self, index: usize) -> Result<Element> {
        let len = self.items.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        Ok(self.items.remove(index))
    }

    /// Detaches the child with identity `id`.
    pub fn remove(&mut self, id: NodeId) -> Option<Element> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    /// Identity membership, not structural.
    pub fn contains(&self, id: NodeId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: NodeId) -> Option<usize> {
        self.items.iter().position(|child| child.node_id() == id)
    }

    pub fn iter(&self) -> slice::Iter<'_, Element> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, Element> {
        self.items.iter_mut()
    }

    /// Releases every child.
    pub fn clear(&mut self) {
        release_all(mem::take(&mut self.items));
    }

    pub(crate) fn drain_into(&mut self, stack: &mut Vec<Element>) {
        stack.append(&mut self.items);
    }
}

impl Drop for Array {
    fn drop(&mut self) {
        self.clear();
    }
}

impl FromIterator<Element> for Array {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Array {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Element;
    type IntoIter = slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
