//! Parser and pipeline configuration.
//!
//! Controls how a document is read:
//! - trailing input policy and nesting limit
//! - which transport, if any, sits between the lexer and the parser

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

/// What to do with non-whitespace input after the top-level value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingInputPolicy {
    #[default]
    Reject,
    Ignore,
}

/// Lexer/parser arrangement.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineModeConfig {
    /// Lexer and parser on the caller's thread.
    #[default]
    Sync,
    /// Lexer thread feeding a blocking bounded channel.
    Channel,
    /// Lexer thread feeding a lock-free SPSC ring buffer.
    Ring,
}

/// Parser configuration parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ParserConfig {
    #[serde(default)]
    pub trailing_input: TrailingInputPolicy,

    /// Deepest container nesting accepted before the parse is aborted.
    #[serde(default = "default_max_depth")]
    #[validate(range(min = 1, max = 65536))]
    pub max_depth: usize,

    #[serde(default)]
    #[validate(nested)]
    pub pipeline: PipelineConfig,
}

fn default_max_depth() -> usize {
    1024
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            trailing_input: TrailingInputPolicy::default(),
            max_depth: default_max_depth(),
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Lexer-to-parser transport configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct PipelineConfig {
    #[serde(default)]
    pub mode: PipelineModeConfig,

    /// Bound of the blocking channel; 0 means unbounded.
    #[serde(default = "default_channel_capacity")]
    #[validate(range(max = 1048576))]
    pub channel_capacity: usize,

    /// Slot count of the ring buffer (must be a power of two).
    #[serde(default = "default_ring_capacity")]
    #[validate(range(min = 2, max = 1048576))]
    #[validate(custom(function = validation::validate_ring_capacity))]
    pub ring_capacity: usize,
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_ring_capacity() -> usize {
    4096
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: PipelineModeConfig::default(),
            channel_capacity: default_channel_capacity(),
            ring_capacity: default_ring_capacity(),
        }
    }
}
