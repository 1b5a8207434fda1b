// crates/roost-ingest/src/handlers/profile.rs
//
// Identity profile handlers: metadata (kind 0), petnames (kind 3), and the
// local user's mute list (kind 10000).

use serde_json::{Map, Value};

use roost_core::error::RoostError;
use roost_core::event::{Event, Tag};
use roost_core::identity::{Identity, IdentityPatch, UserProfile, UserProfilePatch};
use roost_core::parsed::parse_json;
use roost_core::unix_now;

use crate::context::HandlerContext;
use crate::merger::{merge_lww, MergeOutcome};

/// Kind 0: merge profile metadata shallowly onto the stored `kind0`, then
/// start verification for any `nip05` or payment address it carries.
pub fn handle_metadata(ctx: &HandlerContext, event: &Event) -> Result<(), RoostError> {
    let content: Map<String, Value> = match parse_json(&event.content) {
        Ok(content) => content,
        Err(failure) => {
            tracing::debug!(
                "Skipping kind 0 {} from {}: {}",
                event.id,
                event.pubkey,
                failure
            );
            return Ok(());
        }
    };

    let nip05 = non_empty_str(&content, "nip05").map(str::to_string);
    let payment_address = non_empty_str(&content, "lud16")
        .or_else(|| non_empty_str(&content, "lud06"))
        .map(str::to_lowercase);

    let now = unix_now();
    let outcome = merge_lww(
        &ctx.store,
        &event.pubkey,
        event.created_at,
        |identity: &Identity| identity.kind0_updated_at,
        |identity| {
            let mut merged = identity.kind0.clone().unwrap_or_default();
            merged.extend(content);
            if merged.is_empty() {
                return None;
            }
            Some(IdentityPatch {
                kind0: Some(merged),
                kind0_updated_at: Some(event.created_at),
                updated_at: Some(now),
                ..Default::default()
            })
        },
    )?;

    if outcome != MergeOutcome::Applied {
        return Ok(());
    }

    if let Some(verifier) = &ctx.verifier {
        if let Some(identifier) = &nip05 {
            verifier.spawn_nip05(&event.pubkey, identifier);
        }
        if let Some(address) = &payment_address {
            verifier.spawn_zapper(&event.pubkey, address);
        }
    }
    Ok(())
}

fn non_empty_str<'a>(content: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    content
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Kind 3: petnames are the event's `p` tags.
///
/// Applies to the author's identity, and to the local user's profile when
/// the author is the local user.
pub fn handle_petnames(ctx: &HandlerContext, event: &Event) -> Result<(), RoostError> {
    let petnames: Vec<Tag> = event.tags_named("p").cloned().collect();
    if petnames.is_empty() {
        return Ok(());
    }

    let now = unix_now();
    merge_lww(
        &ctx.store,
        &event.pubkey,
        event.created_at,
        |identity: &Identity| identity.petnames_updated_at,
        |_| {
            Some(IdentityPatch {
                petnames: Some(petnames.clone()),
                petnames_updated_at: Some(event.created_at),
                updated_at: Some(now),
                ..Default::default()
            })
        },
    )?;

    if ctx.is_local_user(&event.pubkey) {
        merge_user_profile(ctx, event, |profile| profile.petnames_updated_at, |_| {
            Some(UserProfilePatch {
                petnames: Some((petnames, event.created_at)),
                ..Default::default()
            })
        })?;
    }
    Ok(())
}

/// Kind 10000: the local user's mute list, kept as raw tags.
pub fn handle_mutes(ctx: &HandlerContext, event: &Event) -> Result<(), RoostError> {
    if !ctx.is_local_user(&event.pubkey) || event.tags.is_empty() {
        return Ok(());
    }

    merge_user_profile(ctx, event, |profile| profile.mutes_updated_at, |_| {
        Some(UserProfilePatch {
            mutes: Some((event.tags.clone(), event.created_at)),
            ..Default::default()
        })
    })?;
    Ok(())
}

/// Last-write-wins merge into the local user's profile.
///
/// Stamps the profile with the local pubkey and the engine write time.
pub(crate) fn merge_user_profile<G, C>(
    ctx: &HandlerContext,
    event: &Event,
    guard: G,
    compute: C,
) -> Result<MergeOutcome, RoostError>
where
    G: FnOnce(&UserProfile) -> u64,
    C: FnOnce(&UserProfile) -> Option<UserProfilePatch>,
{
    let now = unix_now();
    merge_lww(
        &ctx.store,
        UserProfile::KEY,
        event.created_at,
        guard,
        |profile| {
            compute(profile).map(|patch| UserProfilePatch {
                pubkey: Some(event.pubkey.clone()),
                updated_at: Some(now),
                ..patch
            })
        },
    )
}
