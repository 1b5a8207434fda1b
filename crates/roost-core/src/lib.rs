// crates/roost-core/src/lib.rs
//
// roost-core: Core types, traits, and relay URL helpers for Roost.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the event record delivered by the networking layer, the derived
// entities (identities, rooms, routes, relay endpoints, the local user's
// profile), the patch types used to mutate them, and the key-value backend
// trait implemented by roost-store.

pub mod error;
pub mod event;
pub mod identity;
pub mod parsed;
pub mod relay_url;
pub mod room;
pub mod route;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use roost_core::Event;`

// Event types
pub use event::{kinds, Event, Tag};

// Entity types
pub use identity::{Identity, IdentityPatch, RelayPolicy, UserProfile, UserProfilePatch, Zapper};
pub use room::{Room, RoomPatch};
pub use route::{route_id, RelayEndpoint, Route, RouteMode};

// Error type
pub use error::RoostError;

// Parsing policy
pub use parsed::{parse_json, ParseFailure, Parsed};

// Traits
pub use traits::{Entity, KeyValueBackend, Patch, Table};

/// Current wall-clock time as unix seconds.
///
/// Used for engine-local write times (`updated_at`) and for "now" in route
/// decay. Protocol timestamps always come from `Event::created_at`.
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
