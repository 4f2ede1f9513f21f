//! Error types for parsing and tree access.

use arbor_core::{AllocError, QueueError};
use thiserror::Error;

/// A lexical or syntactic failure, located in the source text.
///
/// Lines and columns are 1-based; columns count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Every failure the JSON layer reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no such key: {key:?}")]
    InvalidKey { key: String },

    #[error("null reference: {0}")]
    NullReference(String),

    #[error(transparent)]
    Alloc(#[from] AllocError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("lexer thread failed: {0}")]
    Thread(String),
}

impl Error {
    pub(crate) fn mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            message: format!("expected {expected}, found {found}"),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
