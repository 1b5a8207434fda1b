// crates/roost-ingest/src/handlers/mod.rs
//
// Per-kind event handlers.
//
// Every handler has the `HandlerFn` signature and is side-effecting only.
// Malformed content is not an error: the affected field-group is skipped
// with a debug line and the handler returns `Ok(())`. An `Err` means the
// store itself failed; the dispatcher logs it and moves on.

pub mod profile;
pub mod relays;
pub mod rooms;

pub use profile::{handle_metadata, handle_mutes, handle_petnames};
pub use relays::{
    handle_contact_relays, handle_legacy_relay_list, handle_recommend_relay, handle_relay_list,
};
pub use rooms::{handle_room_create, handle_room_metadata};
