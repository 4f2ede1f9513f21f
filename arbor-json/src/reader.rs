//! ## arbor-json::reader
//! **Configured entry point**
//!
//! A `Reader` owns one set of node pools and the options every parse runs
//! with. Trees it returns keep their pools alive on their own, so a `Reader`
//! may be dropped while its trees are still in use.

use arbor_config::{
    AllocStrategyConfig, ArborConfig, PipelineModeConfig, TrailingInputPolicy,
};
use arbor_core::alloc::StrategyKind;
use tracing::{debug, debug_span};

use crate::error::Result;
use crate::model::{Element, NodePools};
use crate::parser::{ParserOptions, TrailingInput};
use crate::pipeline::{self, PipelineMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub mode: PipelineMode,
    pub trailing: TrailingInput,
    pub max_depth: usize,
    /// Allocator strategy for the reader's node pools.
    pub strategy: StrategyKind,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            mode: PipelineMode::default(),
            trailing: TrailingInput::default(),
            max_depth: ParserOptions::DEFAULT_MAX_DEPTH,
            strategy: StrategyKind::default(),
        }
    }
}

impl ParseOptions {
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            trailing: self.trailing,
            max_depth: self.max_depth,
        }
    }
}

impl From<&ArborConfig> for ParseOptions {
    fn from(config: &ArborConfig) -> Self {
        let pipeline = &config.parser.pipeline;
        let mode = match pipeline.mode {
            PipelineModeConfig::Sync => PipelineMode::Sync,
            PipelineModeConfig::Channel => PipelineMode::Channel {
                capacity: pipeline.channel_capacity,
            },
            PipelineModeConfig::Ring => PipelineMode::Ring {
                capacity: pipeline.ring_capacity,
            },
        };
        let trailing = match config.parser.trailing_input {
            TrailingInputPolicy::Reject => TrailingInput::Reject,
            TrailingInputPolicy::Ignore => TrailingInput::Ignore,
        };
        let strategy = match config.memory.strategy {
            AllocStrategyConfig::Direct => StrategyKind::Direct,
            AllocStrategyConfig::FreeList => StrategyKind::FreeList,
            AllocStrategyConfig::Slab => StrategyKind::Slab {
                slots_per_block: config.memory.slab_block_slots,
            },
        };
        Self {
            mode,
            trailing,
            max_depth: config.parser.max_depth,
            strategy,
        }
    }
}

#[derive(Debug)]
pub struct Reader {
    options: ParseOptions,
    pools: NodePools,
}

impl Reader {
    /// Creates a reader with fresh pools built from `options.strategy`.
    pub fn new(options: ParseOptions) -> Result<Self> {
        let pools = NodePools::new(options.strategy)?;
        Ok(Self { options, pools })
    }

    /// Creates a reader that allocates from existing pools; `options.strategy`
    /// is not consulted.
    pub fn with_pools(options: ParseOptions, pools: NodePools) -> Self {
        Self { options, pools }
    }

    pub fn parse(&self, src: &str) -> Result<Element> {
        let span = debug_span!("parse", mode = self.options.mode.name(), bytes = src.len());
        let _enter = span.enter();

        let result = pipeline::run(
            src,
            &self.pools,
            self.options.parser_options(),
            self.options.mode,
        );
        match &result {
            Ok(root) => debug!(root = root.type_name(), "parse finished"),
            Err(err) => debug!(error = %err, "parse failed"),
        }
        result
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn pools(&self) -> &NodePools {
        &self.pools
    }
}

/// Parses `src` with default options into freshly created pools.
pub fn parse(src: &str) -> Result<Element> {
    Reader::new(ParseOptions::default())?.parse(src)
}
