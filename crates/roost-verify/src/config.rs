// crates/roost-verify/src/config.rs

use serde::{Deserialize, Serialize};

/// Tunables for the verification side-channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifyConfig {
    /// When false, lookups are never started.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Per-lookup timeout. A timeout is an ordinary swallowed failure.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum lookups in flight at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent() -> usize {
    8
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            timeout_secs: default_timeout_secs(),
            max_concurrent: default_max_concurrent(),
        }
    }
}
