// crates/roost-ingest/src/config.rs

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Batch chunking settings for the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestConfig {
    /// Events handled back to back before yielding.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Pause between chunks of one batch, in milliseconds.
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,
}

fn default_chunk_size() -> usize {
    100
}

fn default_chunk_delay_ms() -> u64 {
    30
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_delay_ms: default_chunk_delay_ms(),
        }
    }
}

impl IngestConfig {
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }
}
