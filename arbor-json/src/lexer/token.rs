use std::fmt;

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    ObjectBegin,
    ObjectEnd,
    ArrayBegin,
    ArrayEnd,
    Colon,
    Comma,
    String,
    Integer,
    Float,
    Bool,
    Null,
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::ObjectBegin => "'{'",
            TokenKind::ObjectEnd => "'}'",
            TokenKind::ArrayBegin => "'['",
            TokenKind::ArrayEnd => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::String => "string",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::Bool => "boolean",
            TokenKind::Null => "null",
            TokenKind::End => "end of input",
        };
        f.write_str(name)
    }
}

/// One lexical unit, borrowing its text from the source buffer.
///
/// For strings, `text` is the raw content between the quotes with escape
/// sequences left as written. `line` and `column` locate the first
/// character of the token (the opening quote for strings).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: usize,
    pub column: usize,
}

impl Token<'_> {
    /// Human-readable form for error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::End => self.kind.to_string(),
            TokenKind::String => format!("string \"{}\"", self.text),
            _ => format!("'{}'", self.text),
        }
    }
}
