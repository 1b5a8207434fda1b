// crates/roost-store/src/entity_store.rs
//
// EntityStore: typed tables over a `KeyValueBackend`.
//
// Every write goes through a read-merge-write cycle held under a lock
// striped by (table, key). Two patches to the same entity never interleave,
// patches to different entities only contend when they hash to the same
// stripe, and there is no store-wide lock. This lets verification callbacks
// land while later batches are patching the same identity without losing
// either update.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};

use roost_core::error::RoostError;
use roost_core::traits::{Entity, KeyValueBackend, Patch, Table};

use crate::memory::MemoryBackend;

const LOCK_STRIPES: usize = 64;

pub struct EntityStore {
    backend: Arc<dyn KeyValueBackend>,
    stripes: Vec<Mutex<()>>,
}

impl EntityStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self {
            backend,
            stripes: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    /// A store backed by a fresh [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    fn lock(&self, table: Table, key: &str) -> Result<MutexGuard<'_, ()>, RoostError> {
        let mut hasher = DefaultHasher::new();
        table.hash(&mut hasher);
        key.hash(&mut hasher);
        let stripe = (hasher.finish() as usize) % self.stripes.len();
        self.stripes[stripe]
            .lock()
            .map_err(|e| RoostError::Storage(format!("Stripe lock poisoned: {}", e)))
    }

    fn read<E: Entity>(&self, key: &str) -> Result<Option<E>, RoostError> {
        match self.backend.get(E::TABLE, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<E: Entity>(&self, key: &str, entity: &E) -> Result<(), RoostError> {
        let json = serde_json::to_vec(entity)?;
        self.backend.put(E::TABLE, key, &json)
    }

    /// Get a row by primary key.
    pub fn get<E: Entity>(&self, key: &str) -> Result<Option<E>, RoostError> {
        self.read(key)
    }

    /// Insert or replace a row.
    pub fn put<E: Entity>(&self, entity: &E) -> Result<(), RoostError> {
        let key = entity.key();
        let _guard = self.lock(E::TABLE, &key)?;
        self.write(&key, entity)
    }

    /// Insert a row only if its key is not stored yet. Returns whether it was inserted.
    pub fn insert_if_absent<E: Entity>(&self, entity: &E) -> Result<bool, RoostError> {
        let key = entity.key();
        let _guard = self.lock(E::TABLE, &key)?;
        if self.backend.get(E::TABLE, &key)?.is_some() {
            return Ok(false);
        }
        self.write(&key, entity)?;
        Ok(true)
    }

    /// Conditionally mutate a row in one atomic step.
    ///
    /// `f` sees the stored row, or `E::empty(key)` when none exists, and
    /// returns whether it changed anything. The row is written back only
    /// when it did. Returns the row as stored after the call, or `None` if
    /// the key was absent and `f` declined to create it.
    pub fn update<E, F>(&self, key: &str, f: F) -> Result<Option<E>, RoostError>
    where
        E: Entity,
        F: FnOnce(&mut E) -> bool,
    {
        let _guard = self.lock(E::TABLE, key)?;
        let existing = self.read::<E>(key)?;
        let existed = existing.is_some();
        let mut entity = existing.unwrap_or_else(|| E::empty(key));

        if f(&mut entity) {
            self.write(key, &entity)?;
            return Ok(Some(entity));
        }
        Ok(existed.then_some(entity))
    }

    /// Apply a partial-field patch atomically, creating the row if needed.
    pub fn patch<E, P>(&self, key: &str, patch: P) -> Result<E, RoostError>
    where
        E: Entity,
        P: Patch<E>,
    {
        let updated = self.update::<E, _>(key, |entity| {
            patch.apply_to(entity);
            true
        })?;
        updated.ok_or_else(|| {
            RoostError::InvalidState(format!("patch on {} produced no row", key))
        })
    }

    /// Full-table scan. Rows that fail to decode are skipped with a warning.
    pub fn list<E: Entity>(&self) -> Result<Vec<E>, RoostError> {
        let rows = self.backend.scan(E::TABLE)?;
        let mut entities = Vec::with_capacity(rows.len());
        for bytes in rows {
            match serde_json::from_slice(&bytes) {
                Ok(entity) => entities.push(entity),
                Err(e) => tracing::warn!("Skipping undecodable {} row: {}", E::TABLE.name(), e),
            }
        }
        Ok(entities)
    }
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("stripes", &self.stripes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use roost_core::identity::{Identity, IdentityPatch};
    use roost_core::route::RelayEndpoint;

    #[test]
    fn test_get_missing_returns_none() {
        let store = EntityStore::in_memory();
        assert!(store.get::<Identity>("nobody").unwrap().is_none());
    }

    #[test]
    fn test_patch_creates_missing_row() {
        let store = EntityStore::in_memory();
        let identity: Identity = store
            .patch(
                "pk",
                IdentityPatch {
                    verified_as: Some("bob@example.com".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(identity.pubkey, "pk");
        assert_eq!(
            store.get::<Identity>("pk").unwrap().unwrap().verified_as.as_deref(),
            Some("bob@example.com")
        );
    }

    #[test]
    fn test_update_declined_does_not_create_row() {
        let store = EntityStore::in_memory();
        let result = store.update::<Identity, _>("pk", |_| false).unwrap();
        assert!(result.is_none());
        assert!(store.list::<Identity>().unwrap().is_empty());
    }

    #[test]
    fn test_insert_if_absent_keeps_first_row() {
        let store = EntityStore::in_memory();
        let first = RelayEndpoint {
            url: "wss://relay.example".to_string(),
            first_seen: 1,
        };
        let second = RelayEndpoint {
            url: "wss://relay.example".to_string(),
            first_seen: 2,
        };
        assert!(store.insert_if_absent(&first).unwrap());
        assert!(!store.insert_if_absent(&second).unwrap());
        assert_eq!(
            store.get::<RelayEndpoint>("wss://relay.example").unwrap(),
            Some(first)
        );
    }

    #[test]
    fn test_concurrent_patches_on_one_key_are_not_lost() {
        let store = Arc::new(EntityStore::in_memory());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    for j in 0..50u64 {
                        store
                            .patch::<Identity, _>("pk", move |identity: &mut Identity| {
                                identity.updated_at += 1;
                                if i == 0 && j == 0 {
                                    identity.verified_as = Some("a@b.c".to_string());
                                }
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let identity = store.get::<Identity>("pk").unwrap().unwrap();
        assert_eq!(identity.updated_at, 400);
        assert_eq!(identity.verified_as.as_deref(), Some("a@b.c"));
    }
}
