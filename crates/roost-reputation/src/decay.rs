// crates/roost-reputation/src/decay.rs
//
// Linear time decay for route evidence.
//
// An observation keeps its full weight when fresh and loses it linearly
// over the decay window, reaching zero at exactly one window of age and
// going negative beyond it.

use serde::{Deserialize, Serialize};

/// 30 days in seconds.
pub const DEFAULT_DECAY_WINDOW_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LinearDecay {
    /// Age, in seconds, at which evidence is worth nothing.
    pub window_secs: u64,
}

impl Default for LinearDecay {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_DECAY_WINDOW_SECS,
        }
    }
}

impl LinearDecay {
    pub fn new(window_secs: u64) -> Self {
        Self { window_secs }
    }

    /// Multiplier for evidence observed at `observed_at` when it is now `now`:
    /// `1 - age / window`.
    ///
    /// Observations from the future count as fresh. A zero window decays
    /// everything to zero.
    pub fn factor(&self, now: u64, observed_at: u64) -> f64 {
        if self.window_secs == 0 {
            return 0.0;
        }
        let age = now.saturating_sub(observed_at) as f64;
        1.0 - age / self.window_secs as f64
    }

    /// Decayed evidence score for an observation of the given weight.
    pub fn score(&self, weight: f64, now: u64, observed_at: u64) -> f64 {
        weight * self.factor(now, observed_at)
    }
}
