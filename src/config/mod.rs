pub mod settings;

use crate::core::{DirFilterConfig, DEFAULT_CHUNK_SIZE};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// User-facing search settings, persisted as JSON.
///
/// Missing fields fall back to their defaults, so older config files keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Search inside directories whose name starts with `.`.
    pub include_hidden: bool,
    pub follow_symlinks: bool,
    /// Minimum delay between two visible result batches.
    pub throttle_interval_ms: u64,
    /// Bytes read per step when searching file contents.
    pub content_chunk_size: usize,
}

impl SearchConfig {
    pub fn load() -> Result<Self> {
        settings::load_config(None)
    }

    pub fn dir_filter(&self) -> DirFilterConfig {
        DirFilterConfig {
            include_hidden: self.include_hidden,
            follow_symlinks: self.follow_symlinks,
        }
    }

    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_interval_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            include_hidden: false,
            follow_symlinks: false,
            throttle_interval_ms: 1000,
            content_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
