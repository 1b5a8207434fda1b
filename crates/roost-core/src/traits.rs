// crates/roost-core/src/traits.rs

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::RoostError;

/// The tables kept by the entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Identities,
    Rooms,
    Routes,
    Relays,
    Profile,
    /// Verbatim archive of events published by the local user.
    MyEvents,
}

impl Table {
    /// Stable key prefix for this table.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Identities => "identity",
            Table::Rooms => "room",
            Table::Routes => "route",
            Table::Relays => "relay",
            Table::Profile => "profile",
            Table::MyEvents => "my_event",
        }
    }
}

/// Raw byte storage keyed by (table, key).
///
/// Implemented by roost-store (RocksDB and in-memory backends). Typed access,
/// serialization, and per-key atomic patching live above this trait.
pub trait KeyValueBackend: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    fn get(&self, table: Table, key: &str) -> Result<Option<Vec<u8>>, RoostError>;

    /// Insert or replace the value under `key`.
    fn put(&self, table: Table, key: &str, value: &[u8]) -> Result<(), RoostError>;

    /// Every value in `table`, in key order.
    fn scan(&self, table: Table) -> Result<Vec<Vec<u8>>, RoostError>;
}

/// A row type stored in one of the entity tables.
pub trait Entity: Serialize + DeserializeOwned + Send {
    const TABLE: Table;

    /// Primary key of this row.
    fn key(&self) -> String;

    /// The row synthesised when a patch targets a key with no stored value.
    fn empty(key: &str) -> Self;
}

/// A partial-field update applied to an entity in place.
pub trait Patch<E>: Send {
    fn apply_to(self, entity: &mut E);
}

impl<E, F> Patch<E> for F
where
    F: FnOnce(&mut E) + Send,
{
    fn apply_to(self, entity: &mut E) {
        self(entity)
    }
}
