// crates/roost-ingest/src/dispatch.rs
//
// DispatchTable: kind -> ordered list of handlers.
//
// Handlers for one kind run in registration order. A kind with no handlers
// is ignored by the dispatcher (beyond archiving the local user's events).

use std::collections::BTreeMap;

use roost_core::error::RoostError;
use roost_core::event::{kinds, Event};

use crate::context::HandlerContext;
use crate::handlers;

/// A side-effecting event handler.
pub type HandlerFn = fn(&HandlerContext, &Event) -> Result<(), RoostError>;

#[derive(Clone, Default)]
pub struct DispatchTable {
    handlers: BTreeMap<u32, Vec<(&'static str, HandlerFn)>>,
}

impl DispatchTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table wired with every built-in handler.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table
            .register(kinds::METADATA, "metadata", handlers::handle_metadata)
            .register(
                kinds::RECOMMEND_RELAY,
                "recommend_relay",
                handlers::handle_recommend_relay,
            )
            .register(kinds::CONTACTS, "petnames", handlers::handle_petnames)
            .register(
                kinds::CONTACTS,
                "contact_relays",
                handlers::handle_contact_relays,
            )
            .register(
                kinds::ROOM_CREATE,
                "room_create",
                handlers::handle_room_create,
            )
            .register(
                kinds::ROOM_METADATA,
                "room_metadata",
                handlers::handle_room_metadata,
            )
            .register(kinds::MUTE_LIST, "mutes", handlers::handle_mutes)
            .register(
                kinds::LEGACY_RELAY_LIST,
                "legacy_relay_list",
                handlers::handle_legacy_relay_list,
            )
            .register(kinds::RELAY_LIST, "relay_list", handlers::handle_relay_list);
        table
    }

    /// Append a handler for `kind`. `name` only shows up in logs.
    pub fn register(&mut self, kind: u32, name: &'static str, handler: HandlerFn) -> &mut Self {
        self.handlers.entry(kind).or_default().push((name, handler));
        self
    }

    /// Handlers for `kind`, in registration order.
    pub fn handlers_for(&self, kind: u32) -> &[(&'static str, HandlerFn)] {
        self.handlers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Kinds with at least one handler, ascending.
    pub fn kinds(&self) -> impl Iterator<Item = u32> + '_ {
        self.handlers.keys().copied()
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (kind, handlers) in &self.handlers {
            let names: Vec<&str> = handlers.iter().map(|(name, _)| *name).collect();
            map.entry(kind, &names);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &HandlerContext, _: &Event) -> Result<(), RoostError> {
        Ok(())
    }

    #[test]
    fn test_standard_covers_supported_kinds() {
        let table = DispatchTable::standard();
        let kinds: Vec<u32> = table.kinds().collect();
        assert_eq!(kinds, vec![0, 2, 3, 40, 41, 10000, 10001, 10002]);
    }

    #[test]
    fn test_contacts_run_petnames_before_relays() {
        let table = DispatchTable::standard();
        let names: Vec<&str> = table
            .handlers_for(kinds::CONTACTS)
            .iter()
            .map(|(n, _)| *n)
            .collect();
        assert_eq!(names, vec!["petnames", "contact_relays"]);
    }

    #[test]
    fn test_unknown_kind_has_no_handlers() {
        let table = DispatchTable::standard();
        assert!(table.handlers_for(1).is_empty());
        assert!(table.handlers_for(30023).is_empty());
    }

    #[test]
    fn test_register_appends() {
        let mut table = DispatchTable::new();
        table.register(7, "first", noop).register(7, "second", noop);
        assert_eq!(table.handlers_for(7).len(), 2);
        assert_eq!(table.handlers_for(7)[1].0, "second");
    }
}
