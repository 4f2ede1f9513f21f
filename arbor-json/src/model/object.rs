use std::collections::btree_map::{self, BTreeMap};
use std::mem;

use super::element::release_all;
use super::{Element, NodePools, Value};
use crate::error::{Error, Result};

/// String-keyed members, kept in key order.
#[derive(Debug, Default, PartialEq)]
pub struct Object {
    entries: BTreeMap<String, Element>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unchecked lookup: `None` when the key is absent.
    pub fn get(&self, key: &str) -> Option<&Element> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Element> {
        self.entries.get_mut(key)
    }

    /// Checked lookup.
    pub fn at(&self, key: &str) -> Result<&Element> {
        self.entries.get(key).ok_or_else(|| Error::InvalidKey {
            key: key.to_owned(),
        })
    }

    pub fn at_mut(&mut self, key: &str) -> Result<&mut Element> {
        self.entries.get_mut(key).ok_or_else(|| Error::InvalidKey {
            key: key.to_owned(),
        })
    }

    /// Stores `element` under `key`. An existing member is released before
    /// the new one is stored.
    pub fn insert(&mut self, key: impl Into<String>, element: Element) {
        let key = key.into();
        if let Some(previous) = self.entries.remove(&key) {
            release_all([previous]);
        }
        self.entries.insert(key, element);
    }

    /// Stores a new scalar allocated from `pools`.
    pub fn insert_value(
        &mut self,
        pools: &NodePools,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.insert(key, pools.value(value));
    }

    /// Detaches the member under `key` and hands it back to the caller.
    pub fn remove(&mut self, key: &str) -> Option<Element> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Element> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, String, Element> {
        self.entries.iter_mut()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, Element> {
        self.entries.keys()
    }

    /// Releases every member.
    pub fn clear(&mut self) {
        release_all(mem::take(&mut self.entries).into_values());
    }

    pub(crate) fn drain_into(&mut self, stack: &mut Vec<Element>) {
        stack.extend(mem::take(&mut self.entries).into_values());
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Element);
    type IntoIter = btree_map::Iter<'a, String, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::alloc::StrategyKind;

    #[test]
    fn overwrite_releases_previous_value() {
        let pools = NodePools::new(StrategyKind::FreeList).unwrap();
        let mut object = Object::new();

        let mut nested = pools.array();
        nested.as_array_mut().unwrap().push_value(&pools, 1);
        nested.as_array_mut().unwrap().push_value(&pools, 2);
        object.insert("k", nested);
        assert_eq!(pools.stats().live(), 3);

        object.insert_value(&pools, "k", true);
        assert_eq!(pools.stats().live(), 1);
        assert!(object.at("k").unwrap().as_bool().unwrap());
        assert_eq!(object.len(), 1);
    }

    #[test]
    fn checked_lookup_reports_key() {
        let object = Object::new();
        assert!(object.get("missing").is_none());
        assert_eq!(
            object.at("missing").unwrap_err(),
            Error::InvalidKey {
                key: "missing".into()
            }
        );
    }

    #[test]
    fn keys_are_ordered() {
        let pools = NodePools::new(StrategyKind::Direct).unwrap();
        let mut object = Object::new();
        for key in ["b", "c", "a"] {
            object.insert_value(&pools, key, ());
        }
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b", "c"]);

        assert!(object.contains_key("b"));
        assert!(object.remove("b").unwrap().is_null());
        assert!(!object.contains_key("b"));
    }
}
