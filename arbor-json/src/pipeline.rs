//! ## arbor-json::pipeline
//! **Lexer/parser arrangements**
//!
//! `Sync` runs the tokenizer and the parser on the caller's thread. The two
//! concurrent modes move the tokenizer onto a scoped lexer thread that pushes
//! every token (ending with `End`, or with the first lexical error) into a
//! queue, while the caller's thread runs the unchanged parser over that
//! queue. Whatever the outcome, the queue is shut down and the lexer thread
//! joined before `parse` returns.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ScopedJoinHandle};

use arbor_core::sync::{Channel, Producer, RingBuffer};
use crossbeam::utils::Backoff;
use tracing::trace;

use crate::error::{Error, Result};
use crate::lexer::Tokenizer;
use crate::model::{Element, NodePools};
use crate::parser::{ChannelSource, LexItem, Parser, ParserOptions, RingSource};

pub const LEXER_THREAD_NAME: &str = "arbor-lexer";

/// How tokens travel from the tokenizer to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineMode {
    /// Same thread, no queue.
    #[default]
    Sync,
    /// Lexer thread and a blocking channel; capacity 0 is unbounded.
    Channel { capacity: usize },
    /// Lexer thread and a lock-free SPSC ring; capacity must be a power of two.
    Ring { capacity: usize },
}

impl PipelineMode {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineMode::Sync => "sync",
            PipelineMode::Channel { .. } => "channel",
            PipelineMode::Ring { .. } => "ring",
        }
    }
}

/// Parses `src` into a tree allocated from `pools`.
pub fn run(
    src: &str,
    pools: &NodePools,
    options: ParserOptions,
    mode: PipelineMode,
) -> Result<Element> {
    match mode {
        PipelineMode::Sync => run_sync(src, pools, options),
        PipelineMode::Channel { capacity } => run_channel(src, pools, options, capacity),
        PipelineMode::Ring { capacity } => run_ring(src, pools, options, capacity),
    }
}

fn run_sync(src: &str, pools: &NodePools, options: ParserOptions) -> Result<Element> {
    let tokenizer = Tokenizer::new(src)?;
    Ok(Parser::new(tokenizer, pools, options).parse()?)
}

fn run_channel(
    src: &str,
    pools: &NodePools,
    options: ParserOptions,
    capacity: usize,
) -> Result<Element> {
    let channel: Channel<LexItem<'_>> = Channel::with_capacity(capacity);

    thread::scope(|scope| {
        let lexer = spawn_lexer(scope, || {
            let _close = CloseOnDrop(&channel);
            lex(src, |item| channel.push(item).is_ok())
        })?;

        let parsed = Parser::new(ChannelSource::new(&channel), pools, options).parse();
        // Unblocks a lexer still waiting for room after an early parse error.
        channel.close();
        join_lexer(lexer)?;
        Ok(parsed?)
    })
}

fn run_ring(
    src: &str,
    pools: &NodePools,
    options: ParserOptions,
    capacity: usize,
) -> Result<Element> {
    let (mut producer, consumer) = RingBuffer::with_capacity(capacity)?.split();
    let stop = AtomicBool::new(false);
    let finished = AtomicBool::new(false);

    thread::scope(|scope| {
        let (stop, finished_flag) = (&stop, &finished);
        let lexer = spawn_lexer(scope, move || {
            let _finished = RaiseOnDrop(finished_flag);
            lex(src, |item| push_with_backoff(&mut producer, item, stop))
        })?;

        let parsed = Parser::new(RingSource::new(consumer, &finished), pools, options).parse();
        stop.store(true, Ordering::Release);
        join_lexer(lexer)?;
        Ok(parsed?)
    })
}

/// Feeds every token of `src` to `sink` until `End`, the first lexical error,
/// or until `sink` refuses an item. Returns the number of items delivered.
fn lex<'a>(src: &'a str, mut sink: impl FnMut(LexItem<'a>) -> bool) -> usize {
    trace!(bytes = src.len(), "lexer thread started");
    let mut delivered = 0;
    match Tokenizer::new(src) {
        Ok(tokenizer) => {
            for item in tokenizer {
                if !sink(item) {
                    break;
                }
                delivered += 1;
            }
        }
        Err(err) => {
            if sink(Err(err)) {
                delivered += 1;
            }
        }
    }
    trace!(delivered, "lexer thread finished");
    delivered
}

/// Retries a full ring until there is room, or until the consumer asks the
/// producer to stop.
fn push_with_backoff<'a>(
    producer: &mut Producer<LexItem<'a>>,
    mut item: LexItem<'a>,
    stop: &AtomicBool,
) -> bool {
    let backoff = Backoff::new();
    loop {
        match producer.push(item) {
            Ok(()) => return true,
            Err(rejected) => {
                if stop.load(Ordering::Acquire) {
                    return false;
                }
                item = rejected;
                backoff.snooze();
            }
        }
    }
}

fn spawn_lexer<'scope, 'env, F>(
    scope: &'scope thread::Scope<'scope, 'env>,
    body: F,
) -> Result<ScopedJoinHandle<'scope, usize>>
where
    F: FnOnce() -> usize + Send + 'scope,
{
    thread::Builder::new()
        .name(LEXER_THREAD_NAME.into())
        .spawn_scoped(scope, body)
        .map_err(|err| Error::Thread(format!("failed to spawn lexer thread: {err}")))
}

fn join_lexer(handle: ScopedJoinHandle<'_, usize>) -> Result<()> {
    handle
        .join()
        .map(|_| ())
        .map_err(|payload| Error::Thread(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "lexer thread panicked".to_owned()
    }
}

/// Closes the channel when the lexer leaves, even by panic.
struct CloseOnDrop<'c, T>(&'c Channel<T>);

impl<T> Drop for CloseOnDrop<'_, T> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Raises the ring's `finished` flag when the lexer leaves, even by panic.
struct RaiseOnDrop<'f>(&'f AtomicBool);

impl Drop for RaiseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}
