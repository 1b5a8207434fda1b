// crates/roost-reputation/src/lib.rs
//
// roost-reputation: Route scoring for Roost.
//
// Maintains the Route table. Each observation that a relay serves an
// identity is weighted by its evidence type, decayed linearly by age, and
// folded into a per-(identity, relay, mode) running average. Observations
// that decay to a non-positive score are ignored rather than averaged in.

pub mod decay;
pub mod engine;
pub mod weights;

pub use decay::LinearDecay;
pub use engine::RouteEngine;
pub use weights::{EvidenceType, EvidenceWeights, ReputationConfig};
