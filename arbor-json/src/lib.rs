//! # arbor-json
//!
//! JSON text to an owned, pool-allocated document tree.
//!
//! ```
//! # fn main() -> arbor_json::Result<()> {
//! let root = arbor_json::parse(r#"{"a":1,"b":[1,2,3]}"#)?;
//! assert_eq!(root.get("a")?.as_int()?, 1);
//! assert_eq!(root.get("b")?.at(2)?.as_int()?, 3);
//! assert_eq!(root.serialize(), r#"{"a":1,"b":[1,2,3]}"#);
//! # Ok(())
//! # }
//! ```
//!
//! ### Key Submodules:
//! - `model`: `Element` tree, node pools, serialization
//! - `lexer`: zero-copy `Tokenizer`
//! - `parser`: predictive `Parser` over any `TokenSource`, nesting kept on a heap stack
//! - `pipeline`: synchronous, channel and ring-buffer arrangements
//! - `reader`: `Reader` and `ParseOptions`, the configured entry point

pub mod error;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod reader;

pub use error::{Error, ParseError, Result};
pub use model::{Array, Element, NodeId, NodePools, Object, Ref, Value};
pub use pipeline::PipelineMode;
pub use reader::{parse, ParseOptions, Reader};
