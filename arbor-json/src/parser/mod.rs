//! ## arbor-json::parser
//! **Predictive tree builder over an explicit frame stack**
//!
//! One token of lookahead, no recovery: the first violation aborts the
//! parse. Containers still being read sit on an explicit stack of frames
//! rather than on the call stack, so deep nesting is bounded by `max_depth`
//! alone. The frames own every node built so far, and an aborted parse
//! releases them on the way out.
//!
//! The parser is generic over `TokenSource`, which keeps the grammar
//! independent of whether tokens arrive from a local `Tokenizer` or across a
//! queue from a lexer thread.

mod escape;
mod source;

use std::marker::PhantomData;
use std::mem;

use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};
use crate::model::{Array, Element, NodePools, Object, Value};

pub use source::{ChannelSource, LexItem, RingSource, TokenSource};

/// Handling of non-whitespace input after the top-level value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingInput {
    /// Anything but `End` after the root is an error.
    #[default]
    Reject,
    /// Stop reading once the root is complete.
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    pub trailing: TrailingInput,
    /// Deepest container nesting accepted.
    pub max_depth: usize,
}

impl ParserOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 1024;
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            trailing: TrailingInput::default(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

pub struct Parser<'a, 'p, S> {
    source: S,
    pools: &'p NodePools,
    options: ParserOptions,
    _src: PhantomData<Token<'a>>,
}

/// A container whose closing token has not been read yet.
enum Frame {
    Array(Array),
    Object {
        members: Object,
        /// Key of the member whose value is being read.
        key: String,
    },
}

impl Frame {
    fn attach(&mut self, element: Element) {
        match self {
            Frame::Array(items) => items.push(element),
            Frame::Object { members, key } => members.insert(mem::take(key), element),
        }
    }

    fn closer(&self) -> TokenKind {
        match self {
            Frame::Array(_) => TokenKind::ArrayEnd,
            Frame::Object { .. } => TokenKind::ObjectEnd,
        }
    }

    fn separators(&self) -> &'static str {
        match self {
            Frame::Array(_) => "',' or ']'",
            Frame::Object { .. } => "',' or '}'",
        }
    }

    fn finish(self, pools: &NodePools) -> Element {
        match self {
            Frame::Array(items) => pools.array_from(items),
            Frame::Object { members, .. } => pools.object_from(members),
        }
    }
}

impl<'a, 'p, S: TokenSource<'a>> Parser<'a, 'p, S> {
    pub fn new(source: S, pools: &'p NodePools, options: ParserOptions) -> Self {
        Self {
            source,
            pools,
            options,
            _src: PhantomData,
        }
    }

    /// Reads exactly one top-level value.
    pub fn parse(&mut self) -> Result<Element, ParseError> {
        let root = self.parse_tree()?;
        if self.options.trailing == TrailingInput::Reject {
            let next = self.source.peek()?;
            if next.kind != TokenKind::End {
                return Err(unexpected(&next, "end of input"));
            }
        }
        Ok(root)
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Builds one value. Open containers live on `open`, so nesting depth
    /// costs heap, not call stack.
    fn parse_tree(&mut self) -> Result<Element, ParseError> {
        let mut open: Vec<Frame> = Vec::new();
        let mut next = self.begin_value(&mut open)?;
        loop {
            let Some(done) = next else {
                // A non-empty container was opened; read its first value.
                next = self.begin_value(&mut open)?;
                continue;
            };
            let Some(mut frame) = open.pop() else {
                return Ok(done);
            };
            frame.attach(done);

            let separator = self.source.peek()?;
            if separator.kind == TokenKind::Comma {
                self.source.consume()?;
                if let Frame::Object { key, .. } = &mut frame {
                    *key = self.member_key()?;
                }
                open.push(frame);
                next = self.begin_value(&mut open)?;
            } else if separator.kind == frame.closer() {
                self.source.consume()?;
                next = Some(frame.finish(self.pools));
            } else {
                return Err(unexpected(&separator, frame.separators()));
            }
        }
    }

    /// Reads a scalar, an empty container, or the opening of a non-empty
    /// container. The last case pushes a frame and yields `None`.
    fn begin_value(&mut self, open: &mut Vec<Frame>) -> Result<Option<Element>, ParseError> {
        let token = self.source.peek()?;
        match token.kind {
            TokenKind::ObjectBegin => {
                self.enter(open.len(), &token)?;
                self.source.consume()?;
                if self.source.peek()?.kind == TokenKind::ObjectEnd {
                    self.source.consume()?;
                    return Ok(Some(self.pools.object()));
                }
                let key = self.member_key()?;
                open.push(Frame::Object {
                    members: Object::new(),
                    key,
                });
                Ok(None)
            }
            TokenKind::ArrayBegin => {
                self.enter(open.len(), &token)?;
                self.source.consume()?;
                if self.source.peek()?.kind == TokenKind::ArrayEnd {
                    self.source.consume()?;
                    return Ok(Some(self.pools.array()));
                }
                open.push(Frame::Array(Array::new()));
                Ok(None)
            }
            TokenKind::Integer
            | TokenKind::Float
            | TokenKind::Bool
            | TokenKind::Null
            | TokenKind::String => {
                let value = scalar(&token)?;
                self.source.consume()?;
                Ok(Some(self.pools.value(value)))
            }
            _ => Err(unexpected(&token, "a value")),
        }
    }

    /// Reads `"key" :` and returns the unescaped key.
    fn member_key(&mut self) -> Result<String, ParseError> {
        let key_token = self.source.peek()?;
        if key_token.kind != TokenKind::String {
            return Err(unexpected(&key_token, "a string key"));
        }
        let key = escape::unescape(&key_token)?.into_owned();
        self.source.consume()?;
        self.expect(TokenKind::Colon)?;
        Ok(key)
    }

    /// Checks that opening one more container inside `depth` open ones
    /// stays within `max_depth`.
    fn enter(&self, depth: usize, open: &Token<'a>) -> Result<(), ParseError> {
        if depth >= self.options.max_depth {
            return Err(ParseError::new(
                open.line,
                open.column,
                format!("nesting deeper than {} levels", self.options.max_depth),
            ));
        }
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        let token = self.source.peek()?;
        if token.kind != kind {
            return Err(unexpected(&token, &kind.to_string()));
        }
        self.source.consume()
    }
}

fn scalar(token: &Token<'_>) -> Result<Value, ParseError> {
    let at = |message: String| ParseError::new(token.line, token.column, message);
    Ok(match token.kind {
        TokenKind::Integer => Value::Int(
            token
                .text
                .parse::<i32>()
                .map_err(|_| at(format!("integer {} does not fit in 32 bits", token.text)))?,
        ),
        TokenKind::Float => {
            let value = token
                .text
                .parse::<f32>()
                .map_err(|_| at(format!("invalid number {}", token.text)))?;
            if !value.is_finite() {
                return Err(at(format!("number {} is out of range", token.text)));
            }
            Value::Float(value)
        }
        TokenKind::Bool => Value::Bool(token.text == "true"),
        TokenKind::String => Value::Str(escape::unescape(token)?.into_owned()),
        _ => Value::Null,
    })
}

fn unexpected(token: &Token<'_>, expected: &str) -> ParseError {
    ParseError::new(
        token.line,
        token.column,
        format!("expected {expected}, found {}", token.describe()),
    )
}
