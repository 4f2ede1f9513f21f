//! ## arbor-json::lexer
//! **Zero-copy tokenizer**
//!
//! Turns a source buffer into `Token`s that borrow from it, with one token
//! of lookahead. Escape sequences are left in place; they are decoded when
//! the parser builds string values.

mod token;
mod tokenizer;

pub use token::{Token, TokenKind};
pub use tokenizer::Tokenizer;
