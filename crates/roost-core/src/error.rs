// crates/roost-core/src/error.rs

use thiserror::Error;

/// Workspace-wide error type for Roost.
///
/// None of these are fatal to event ingestion: the dispatcher logs and
/// skips, and the verification side-channel swallows them.
#[derive(Debug, Error)]
pub enum RoostError {
    /// Storage layer error (RocksDB, lock poisoning).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A relay URL failed validation or canonicalization.
    #[error("Invalid relay URL: {0}")]
    InvalidUrl(String),

    /// External lookup failed (network error, bad status, timeout).
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// External lookup succeeded but the claim was rejected.
    #[error("Verification error: {0}")]
    Verification(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid state or configuration.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<serde_json::Error> for RoostError {
    fn from(e: serde_json::Error) -> Self {
        RoostError::Serialization(e.to_string())
    }
}
