use super::{Token, TokenKind};
use crate::error::ParseError;

/// Scans a source buffer into tokens with one token of lookahead.
///
/// Construction primes the first token, so it fails on a lexical error at
/// the very start of the input. After that `consume` scans ahead and a
/// lexical error is held as the lookahead: it surfaces from the next `peek`
/// (or `consume`), so input after the last token a caller looks at is never
/// judged. Once `End` is reached, `consume` is a no-op.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    current: Result<Token<'a>, ParseError>,
    exhausted: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Result<Self, ParseError> {
        let mut tokenizer = Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            current: Ok(Token {
                kind: TokenKind::End,
                text: "",
                line: 1,
                column: 1,
            }),
            exhausted: false,
        };
        tokenizer.current = Ok(tokenizer.next_token()?);
        Ok(tokenizer)
    }

    /// The current lookahead token.
    pub fn peek(&self) -> Result<Token<'a>, ParseError> {
        self.current.clone()
    }

    /// Advances to the next token.
    pub fn consume(&mut self) -> Result<(), ParseError> {
        let token = self.peek()?;
        if token.kind != TokenKind::End {
            self.current = self.next_token();
        }
        Ok(())
    }

    fn next_token(&mut self) -> Result<Token<'a>, ParseError> {
        self.skip_whitespace();
        let (start, line, column) = (self.pos, self.line, self.column);

        let Some(&byte) = self.src.as_bytes().get(self.pos) else {
            return Ok(Token {
                kind: TokenKind::End,
                text: "",
                line,
                column,
            });
        };

        let kind = match byte {
            b'{' => TokenKind::ObjectBegin,
            b'}' => TokenKind::ObjectEnd,
            b'[' => TokenKind::ArrayBegin,
            b']' => TokenKind::ArrayEnd,
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            b'"' => return self.scan_string(),
            b'-' | b'0'..=b'9' => return self.scan_number(),
            b't' => return self.scan_literal("true", TokenKind::Bool),
            b'f' => return self.scan_literal("false", TokenKind::Bool),
            b'n' => return self.scan_literal("null", TokenKind::Null),
            _ => {
                let found = self.src[start..].chars().next().unwrap_or_default();
                return Err(ParseError::new(
                    line,
                    column,
                    format!("unexpected character {found:?}"),
                ));
            }
        };
        self.bump();
        Ok(Token {
            kind,
            text: &self.src[start..self.pos],
            line,
            column,
        })
    }

    fn scan_string(&mut self) -> Result<Token<'a>, ParseError> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let start = self.pos;
        loop {
            match self.current_byte() {
                None => return Err(ParseError::new(line, column, "unterminated string")),
                Some(b'"') => break,
                Some(b'\\') => {
                    self.bump();
                    if self.current_byte().is_none() {
                        return Err(ParseError::new(line, column, "unterminated string"));
                    }
                    self.bump();
                }
                Some(_) => self.bump(),
            }
        }
        let text = &self.src[start..self.pos];
        self.bump();
        Ok(Token {
            kind: TokenKind::String,
            text,
            line,
            column,
        })
    }

    fn scan_number(&mut self) -> Result<Token<'a>, ParseError> {
        let (start, line, column) = (self.pos, self.line, self.column);
        if self.current_byte() == Some(b'-') {
            self.bump();
        }
        if self.skip_digits() == 0 {
            return Err(self.error_here("expected a digit"));
        }

        let mut kind = TokenKind::Integer;
        if self.current_byte() == Some(b'.') {
            self.bump();
            if self.skip_digits() == 0 {
                return Err(self.error_here("expected a digit after the decimal point"));
            }
            kind = TokenKind::Float;
        }

        Ok(Token {
            kind,
            text: &self.src[start..self.pos],
            line,
            column,
        })
    }

    fn scan_literal(
        &mut self,
        word: &'static str,
        kind: TokenKind,
    ) -> Result<Token<'a>, ParseError> {
        let (start, line, column) = (self.pos, self.line, self.column);
        if !self.src[start..].starts_with(word) {
            return Err(ParseError::new(
                line,
                column,
                format!("invalid literal, expected `{word}`"),
            ));
        }
        for _ in 0..word.len() {
            self.bump();
        }
        Ok(Token {
            kind,
            text: &self.src[start..self.pos],
            line,
            column,
        })
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\r' | b'\n') = self.current_byte() {
            self.bump();
        }
    }

    fn skip_digits(&mut self) -> usize {
        let mut count = 0;
        while let Some(b'0'..=b'9') = self.current_byte() {
            self.bump();
            count += 1;
        }
        count
    }

    #[inline]
    fn current_byte(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    /// Steps over one byte, keeping line and column in characters.
    #[inline]
    fn bump(&mut self) {
        let Some(byte) = self.current_byte() else {
            return;
        };
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if byte & 0xC0 != 0x80 {
            // Continuation bytes belong to the character already counted.
            self.column += 1;
        }
    }

    fn error_here(&self, message: &str) -> ParseError {
        ParseError::new(self.line, self.column, message)
    }
}

/// Yields every token up to and including `End`, or stops after the first
/// lexical error.
impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let item = self.peek();
        match &item {
            Ok(token) if token.kind != TokenKind::End => self.current = self.next_token(),
            _ => self.exhausted = true,
        }
        Some(item)
    }
}
