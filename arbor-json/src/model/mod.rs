//! ## arbor-json::model
//! **The document tree**
//!
//! An `Element` is one of three node kinds, each living in a slot of its own
//! `ObjectPool`. Trees are singly owned: containers own their children
//! outright, and dropping (or `clear`ing) a container releases the whole
//! subtree with an explicit worklist rather than recursion, so nesting depth
//! never threatens the stack on teardown.

mod array;
mod cursor;
mod element;
mod object;
mod pools;
mod serialize;
mod value;

pub use array::Array;
pub use cursor::Ref;
pub use element::{Element, NodeId};
pub use object::Object;
pub use pools::{NodePools, PoolStats};
pub use value::Value;
