// crates/roost-ingest/src/handlers/relays.rs
//
// Relay-bearing kinds. Each one can feed the route engine (evidence that
// the author reads or writes at a relay) and, for the local user, replace
// the relay selection in the user profile.

use roost_core::error::RoostError;
use roost_core::event::Event;
use roost_core::identity::{RelayPolicy, UserProfilePatch};
use roost_core::route::RouteMode;
use roost_reputation::EvidenceType;

use crate::context::HandlerContext;
use crate::handlers::profile::merge_user_profile;
use crate::merger::MergeOutcome;
use crate::relay_lists;

/// Kind 2: a single recommended relay, read and write.
pub fn handle_recommend_relay(ctx: &HandlerContext, event: &Event) -> Result<(), RoostError> {
    let url = event.content.trim();
    for mode in RouteMode::BOTH {
        ctx.routes.add_route(
            &event.pubkey,
            url,
            &EvidenceType::Kind2,
            mode,
            event.created_at,
        )?;
    }

    if ctx.is_local_user(&event.pubkey) {
        merge_user_relays(ctx, event, relay_lists::from_recommendation(event))?;
    }
    Ok(())
}

/// Kind 3: relay conditions in the content.
///
/// Petnames from the same event are handled by `handle_petnames`.
pub fn handle_contact_relays(ctx: &HandlerContext, event: &Event) -> Result<(), RoostError> {
    if event.content.trim().is_empty() {
        return Ok(());
    }
    let conditions = match relay_lists::conditions(event) {
        Ok(conditions) => conditions,
        Err(failure) => {
            tracing::debug!(
                "Skipping kind 3 relays {} from {}: {}",
                event.id,
                event.pubkey,
                failure
            );
            return Ok(());
        }
    };

    for (url, condition) in &conditions {
        if !relay_lists::is_negated(condition.get("read")) {
            ctx.routes.add_route(
                &event.pubkey,
                url,
                &EvidenceType::Kind3,
                RouteMode::Read,
                event.created_at,
            )?;
        }
        if !relay_lists::is_negated(condition.get("write")) {
            ctx.routes.add_route(
                &event.pubkey,
                url,
                &EvidenceType::Kind3,
                RouteMode::Write,
                event.created_at,
            )?;
        }
    }

    if ctx.is_local_user(&event.pubkey) {
        merge_user_relays(ctx, event, relay_lists::from_conditions(&conditions))?;
    }
    Ok(())
}

/// Kind 10001: the legacy tag-based relay list. Local user only.
pub fn handle_legacy_relay_list(ctx: &HandlerContext, event: &Event) -> Result<(), RoostError> {
    if !ctx.is_local_user(&event.pubkey) {
        return Ok(());
    }
    merge_user_relays(ctx, event, relay_lists::from_legacy_tags(&event.tags))?;
    Ok(())
}

/// Kind 10002: `r` tags with optional read/write markers.
pub fn handle_relay_list(ctx: &HandlerContext, event: &Event) -> Result<(), RoostError> {
    for (url, modes) in relay_lists::relay_list_entries(event) {
        for mode in modes {
            ctx.routes.add_route(
                &event.pubkey,
                url,
                &EvidenceType::Kind10002,
                mode,
                event.created_at,
            )?;
        }
    }

    if ctx.is_local_user(&event.pubkey) {
        merge_user_relays(ctx, event, relay_lists::from_relay_list(event))?;
    }
    Ok(())
}

/// Replace the local user's relays, guarded per source kind.
fn merge_user_relays(
    ctx: &HandlerContext,
    event: &Event,
    relays: Vec<RelayPolicy>,
) -> Result<MergeOutcome, RoostError> {
    let kind = event.kind;
    let outcome = merge_user_profile(
        ctx,
        event,
        |profile| profile.relays_updated_at_for(kind),
        |_| {
            if relays.is_empty() {
                return None;
            }
            Some(UserProfilePatch {
                relays: Some((relays, kind, event.created_at)),
                ..Default::default()
            })
        },
    )?;
    if outcome == MergeOutcome::Stale {
        tracing::debug!("Ignoring stale kind {} relay list {}", kind, event.id);
    }
    Ok(outcome)
}
