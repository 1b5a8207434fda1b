// crates/roost-reputation/src/weights.rs
//
// Evidence types and their trust weights.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::decay::{LinearDecay, DEFAULT_DECAY_WINDOW_SECS};

/// Where a piece of route evidence came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EvidenceType {
    /// Relays advertised by a verified domain-identity lookup.
    Nip05,
    /// Relay list metadata event.
    Kind10002,
    /// Relay conditions embedded in a contact list.
    Kind3,
    /// Legacy single relay recommendation.
    Kind2,
    /// Any other label. Weighs nothing unless configured.
    Other(String),
}

impl EvidenceType {
    pub fn label(&self) -> &str {
        match self {
            EvidenceType::Nip05 => "nip05",
            EvidenceType::Kind10002 => "kind:10002",
            EvidenceType::Kind3 => "kind:3",
            EvidenceType::Kind2 => "kind:2",
            EvidenceType::Other(label) => label,
        }
    }
}

impl fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weight per evidence label. Unknown labels weigh `0.0`.
///
/// Deserializing merges the given entries over the defaults, so a config
/// file only needs to list the weights it changes.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct EvidenceWeights(BTreeMap<String, f64>);

impl Default for EvidenceWeights {
    fn default() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert("nip05".to_string(), 1.0);
        weights.insert("kind:10002".to_string(), 1.0);
        weights.insert("kind:3".to_string(), 0.8);
        weights.insert("kind:2".to_string(), 0.5);
        Self(weights)
    }
}

impl<'de> Deserialize<'de> for EvidenceWeights {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let overrides = BTreeMap::<String, f64>::deserialize(deserializer)?;
        let mut weights = EvidenceWeights::default();
        weights.0.extend(overrides);
        Ok(weights)
    }
}

impl EvidenceWeights {
    pub fn weight(&self, evidence: &EvidenceType) -> f64 {
        self.0.get(evidence.label()).copied().unwrap_or(0.0)
    }
}

/// Tunables for the reputation engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReputationConfig {
    /// Age at which evidence stops counting. Default: 30 days.
    #[serde(default = "default_decay_window_secs")]
    pub decay_window_secs: u64,
    #[serde(default)]
    pub weights: EvidenceWeights,
}

fn default_decay_window_secs() -> u64 {
    DEFAULT_DECAY_WINDOW_SECS
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            decay_window_secs: default_decay_window_secs(),
            weights: EvidenceWeights::default(),
        }
    }
}

impl ReputationConfig {
    pub fn decay(&self) -> LinearDecay {
        LinearDecay::new(self.decay_window_secs)
    }
}
