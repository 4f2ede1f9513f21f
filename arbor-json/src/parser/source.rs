//! Token sources the parser can pull from.
//!
//! The grammar only ever sees `peek`/`consume`; whether tokens come straight
//! from a `Tokenizer` or across a queue from a lexer thread is decided here.

use std::sync::atomic::{AtomicBool, Ordering};

use arbor_core::sync::{Channel, Consumer};
use crossbeam::utils::Backoff;

use crate::error::ParseError;
use crate::lexer::{Token, Tokenizer};

/// What a lexer thread sends: a token, or the lexical error that ended the
/// stream.
pub type LexItem<'a> = Result<Token<'a>, ParseError>;

/// One-token-lookahead stream of tokens.
pub trait TokenSource<'a> {
    /// The current token, without advancing.
    fn peek(&mut self) -> Result<Token<'a>, ParseError>;

    /// Moves past the current token.
    fn consume(&mut self) -> Result<(), ParseError>;
}

impl<'a> TokenSource<'a> for Tokenizer<'a> {
    fn peek(&mut self) -> Result<Token<'a>, ParseError> {
        Tokenizer::peek(self)
    }

    fn consume(&mut self) -> Result<(), ParseError> {
        Tokenizer::consume(self)
    }
}

impl<'a, S: TokenSource<'a> + ?Sized> TokenSource<'a> for &mut S {
    fn peek(&mut self) -> Result<Token<'a>, ParseError> {
        (**self).peek()
    }

    fn consume(&mut self) -> Result<(), ParseError> {
        (**self).consume()
    }
}

/// Remembers the lookahead token pulled off a queue and where the stream
/// stood, so a stream that stops early can be reported in place.
#[derive(Debug, Default)]
struct Lookahead<'a> {
    current: Option<Token<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lookahead<'a> {
    fn accept(&mut self, item: LexItem<'a>) -> Result<Token<'a>, ParseError> {
        let token = item?;
        self.line = token.line;
        self.column = token.column;
        self.current = Some(token);
        Ok(token)
    }

    fn cut_short(&self) -> ParseError {
        ParseError::new(
            self.line.max(1),
            self.column.max(1),
            "token stream ended before end of input",
        )
    }
}

/// Pulls tokens from a blocking `Channel` fed by a lexer thread.
#[derive(Debug)]
pub struct ChannelSource<'c, 'a> {
    channel: &'c Channel<LexItem<'a>>,
    lookahead: Lookahead<'a>,
}

impl<'c, 'a> ChannelSource<'c, 'a> {
    pub fn new(channel: &'c Channel<LexItem<'a>>) -> Self {
        Self {
            channel,
            lookahead: Lookahead::default(),
        }
    }
}

impl<'a> TokenSource<'a> for ChannelSource<'_, 'a> {
    fn peek(&mut self) -> Result<Token<'a>, ParseError> {
        if let Some(token) = self.lookahead.current {
            return Ok(token);
        }
        match self.channel.pop() {
            Some(item) => self.lookahead.accept(item),
            None => Err(self.lookahead.cut_short()),
        }
    }

    fn consume(&mut self) -> Result<(), ParseError> {
        self.peek()?;
        self.lookahead.current = None;
        Ok(())
    }
}

/// Pulls tokens from the consumer end of a `RingBuffer`, backing off while
/// the ring is empty.
///
/// `finished` is raised by the lexer thread once it will push nothing more.
pub struct RingSource<'f, 'a> {
    consumer: Consumer<LexItem<'a>>,
    finished: &'f AtomicBool,
    lookahead: Lookahead<'a>,
}

impl<'f, 'a> RingSource<'f, 'a> {
    pub fn new(consumer: Consumer<LexItem<'a>>, finished: &'f AtomicBool) -> Self {
        Self {
            consumer,
            finished,
            lookahead: Lookahead::default(),
        }
    }
}

impl<'a> TokenSource<'a> for RingSource<'_, 'a> {
    fn peek(&mut self) -> Result<Token<'a>, ParseError> {
        if let Some(token) = self.lookahead.current {
            return Ok(token);
        }
        let backoff = Backoff::new();
        loop {
            if let Some(item) = self.consumer.pop() {
                return self.lookahead.accept(item);
            }
            if self.finished.load(Ordering::Acquire) {
                // The last push may have landed after our failed pop.
                return match self.consumer.pop() {
                    Some(item) => self.lookahead.accept(item),
                    None => Err(self.lookahead.cut_short()),
                };
            }
            backoff.snooze();
        }
    }

    fn consume(&mut self) -> Result<(), ParseError> {
        self.peek()?;
        self.lookahead.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;
    use arbor_core::sync::RingBuffer;

    fn feed<'a>(src: &'a str) -> Vec<LexItem<'a>> {
        Tokenizer::new(src).unwrap().collect()
    }

    #[test]
    fn channel_source_replays_tokens() {
        let channel = Channel::unbounded();
        for item in feed("[1,2]") {
            channel.push(item).unwrap();
        }
        channel.close();

        let mut source = ChannelSource::new(&channel);
        let mut kinds = Vec::new();
        loop {
            let token = source.peek().unwrap();
            assert_eq!(source.peek().unwrap(), token);
            kinds.push(token.kind);
            if token.kind == TokenKind::End {
                break;
            }
            source.consume().unwrap();
        }
        assert_eq!(kinds.len(), 6);
    }

    #[test]
    fn closed_channel_is_reported_at_last_token() {
        let channel = Channel::unbounded();
        let mut items = feed("[1, 2]");
        items.truncate(2);
        for item in items {
            channel.push(item).unwrap();
        }
        channel.close();

        let mut source = ChannelSource::new(&channel);
        source.consume().unwrap();
        source.consume().unwrap();
        let err = source.peek().unwrap_err();
        assert_eq!((err.line, err.column), (1, 2));
    }

    #[test]
    fn ring_source_stops_when_producer_finishes() {
        let (mut producer, consumer) = RingBuffer::with_capacity(8).unwrap().split();
        let finished = AtomicBool::new(false);
        for item in feed("true") {
            producer.push(item).unwrap();
        }
        finished.store(true, Ordering::Release);

        let mut source = RingSource::new(consumer, &finished);
        assert_eq!(source.peek().unwrap().kind, TokenKind::Bool);
        source.consume().unwrap();
        assert_eq!(source.peek().unwrap().kind, TokenKind::End);
        source.consume().unwrap();
        assert!(source.peek().is_err());
    }

    #[test]
    fn lexical_errors_pass_through() {
        let channel = Channel::unbounded();
        for item in Tokenizer::new("[@").unwrap() {
            channel.push(item).unwrap();
        }
        let mut source = ChannelSource::new(&channel);
        source.consume().unwrap();
        let err = source.peek().unwrap_err();
        assert_eq!(err.column, 2);
    }
}
