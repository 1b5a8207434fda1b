// crates/roost-ingest/src/handlers/rooms.rs
//
// Public chat rooms: kind 40 creates a room (its id is the event id), kind
// 41 updates the room named by its first `e` tag.

use serde_json::{Map, Value};

use roost_core::error::RoostError;
use roost_core::event::{kinds, Event};
use roost_core::parsed::parse_json;
use roost_core::room::{Room, RoomPatch};

use crate::context::HandlerContext;
use crate::merger::merge_lww;

pub fn handle_room_create(ctx: &HandlerContext, event: &Event) -> Result<(), RoostError> {
    merge_room(ctx, event, &event.id)
}

pub fn handle_room_metadata(ctx: &HandlerContext, event: &Event) -> Result<(), RoostError> {
    let Some(room_id) = event.first_tag_value("e").filter(|id| !id.is_empty()) else {
        tracing::debug!("Room metadata {} has no room reference", event.id);
        return Ok(());
    };
    merge_room(ctx, event, room_id)
}

fn merge_room(ctx: &HandlerContext, event: &Event, room_id: &str) -> Result<(), RoostError> {
    let content: Map<String, Value> = match parse_json(&event.content) {
        Ok(content) => content,
        Err(failure) => {
            tracing::debug!(
                "Skipping room event {} for {}: {}",
                event.id,
                room_id,
                failure
            );
            return Ok(());
        }
    };
    let Some(patch) = RoomPatch::from_content(&content) else {
        tracing::debug!("Room event {} for {} carries no name", event.id, room_id);
        return Ok(());
    };

    merge_lww(
        &ctx.store,
        room_id,
        event.created_at,
        |room: &Room| room.updated_at,
        |room| {
            // Metadata updates never replace the creator.
            let sets_creator = event.kind == kinds::ROOM_CREATE || room.pubkey.is_empty();
            Some(RoomPatch {
                pubkey: sets_creator.then(|| event.pubkey.clone()),
                updated_at: Some(event.created_at),
                ..patch
            })
        },
    )?;
    Ok(())
}
