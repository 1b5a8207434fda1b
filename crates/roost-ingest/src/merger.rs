// crates/roost-ingest/src/merger.rs
//
// Last-write-wins merging.
//
// Every field-group (an identity's kind0, its petnames, a room's metadata,
// the local user's relays...) has a stored `updated_at` guard. An event is
// applied to a field-group only if `created_at >= guard`: strictly older
// events are dropped, equal timestamps go to whichever event is processed
// last. The new value is computed from the stored row, and an empty result
// writes nothing, so an unparseable or empty event never wipes good data.
//
// The guard check, the computation, and the write happen under one
// per-entity lock.

use roost_core::error::RoostError;
use roost_core::traits::{Entity, Patch};
use roost_store::EntityStore;

/// What happened to one field-group merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The event was older than the stored guard.
    Stale,
    /// The computed value was empty; nothing written.
    Empty,
    /// The patch was written.
    Applied,
}

/// `true` when an event at `created_at` must not overwrite a field-group
/// last written at `stored_updated_at`.
pub fn is_stale(created_at: u64, stored_updated_at: u64) -> bool {
    created_at < stored_updated_at
}

/// Merge one field-group of entity `key` under a last-write-wins guard.
///
/// `guard` reads the field-group's stored timestamp. `compute` sees the
/// stored row (or `E::empty(key)`) and returns the patch to apply, or
/// `None` when the event yields nothing. The patch is responsible for
/// setting the field and its guard to the event's `created_at`.
pub fn merge_lww<E, P, G, C>(
    store: &EntityStore,
    key: &str,
    created_at: u64,
    guard: G,
    compute: C,
) -> Result<MergeOutcome, RoostError>
where
    E: Entity,
    P: Patch<E>,
    G: FnOnce(&E) -> u64,
    C: FnOnce(&E) -> Option<P>,
{
    let mut outcome = MergeOutcome::Empty;
    store.update::<E, _>(key, |entity| {
        if is_stale(created_at, guard(entity)) {
            outcome = MergeOutcome::Stale;
            return false;
        }
        match compute(entity) {
            Some(patch) => {
                patch.apply_to(entity);
                outcome = MergeOutcome::Applied;
                true
            }
            None => false,
        }
    })?;
    Ok(outcome)
}
