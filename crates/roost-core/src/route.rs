// crates/roost-core/src/route.rs
//
// Routes and relay endpoints.
//
// A Route is the evidence-weighted belief that a relay endpoint is where an
// identity reads or writes. Routes are keyed by a digest of
// (pubkey, canonical url, mode) so the same triple always lands on one row.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::traits::{Entity, Table};

/// Direction of a route.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    Read,
    Write,
}

impl RouteMode {
    pub const BOTH: [RouteMode; 2] = [RouteMode::Read, RouteMode::Write];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMode::Read => "read",
            RouteMode::Write => "write",
        }
    }

    /// Parse a relay-list marker (`"read"` / `"write"`), case-sensitive.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "read" => Some(RouteMode::Read),
            "write" => Some(RouteMode::Write),
            _ => None,
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Deterministic route id: hex SHA-256 of `pubkey:url:mode`.
pub fn route_id(pubkey: &str, url: &str, mode: RouteMode) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pubkey.as_bytes());
    hasher.update(b":");
    hasher.update(url.as_bytes());
    hasher.update(b":");
    hasher.update(mode.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub id: String,
    pub pubkey: String,
    /// Canonical relay URL.
    pub url: String,
    pub mode: RouteMode,
    /// Running average of every positive evidence score folded in.
    pub score: f64,
    /// Number of positive evidence scores folded in.
    pub count: u64,
    /// Evidence type labels observed (e.g. `"nip05"`, `"kind:10002"`).
    pub types: BTreeSet<String>,
    /// Newest observation time folded in, unix seconds.
    pub last_seen: u64,
}

impl Route {
    /// A route with no evidence yet.
    pub fn new(pubkey: &str, url: &str, mode: RouteMode) -> Self {
        Route {
            id: route_id(pubkey, url, mode),
            pubkey: pubkey.to_string(),
            url: url.to_string(),
            mode,
            score: 0.0,
            count: 0,
            types: BTreeSet::new(),
            last_seen: 0,
        }
    }
}

impl Entity for Route {
    const TABLE: Table = Table::Routes;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn empty(key: &str) -> Self {
        Route {
            id: key.to_string(),
            pubkey: String::new(),
            url: String::new(),
            mode: RouteMode::Read,
            score: 0.0,
            count: 0,
            types: BTreeSet::new(),
            last_seen: 0,
        }
    }
}

/// A relay endpoint referenced by at least one piece of route evidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RelayEndpoint {
    /// Canonical URL (primary key).
    pub url: String,
    /// Engine-local time the endpoint was first referenced.
    #[serde(default)]
    pub first_seen: u64,
}

impl Entity for RelayEndpoint {
    const TABLE: Table = Table::Relays;

    fn key(&self) -> String {
        self.url.clone()
    }

    fn empty(key: &str) -> Self {
        RelayEndpoint {
            url: key.to_string(),
            first_seen: 0,
        }
    }
}
