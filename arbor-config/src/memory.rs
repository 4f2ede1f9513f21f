//! Node memory configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Allocator strategy backing the node pools.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocStrategyConfig {
    Direct,
    FreeList,
    #[default]
    Slab,
}

/// Memory allocation configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct MemoryConfig {
    #[serde(default)]
    pub strategy: AllocStrategyConfig,

    /// Node slots reserved per slab block.
    #[serde(default = "default_slab_block_slots")]
    #[validate(range(min = 1, max = 1048576))]
    pub slab_block_slots: usize,
}

fn default_slab_block_slots() -> usize {
    256
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            strategy: AllocStrategyConfig::default(),
            slab_block_slots: default_slab_block_slots(),
        }
    }
}
