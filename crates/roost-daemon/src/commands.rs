// crates/roost-daemon/src/commands.rs
//
// Store construction and the read-only inspection subcommands.

use std::sync::Arc;

use serde::Serialize;

use roost_core::error::RoostError;
use roost_core::identity::{Identity, UserProfile};
use roost_core::room::Room;
use roost_core::route::{Route, RouteMode};
use roost_reputation::RouteEngine;
use roost_store::{EntityStore, RocksBackend};

use crate::config::{DaemonConfig, StoreBackend};

/// Open the entity store on the configured backend.
pub fn open_store(config: &DaemonConfig) -> Result<Arc<EntityStore>, Box<dyn std::error::Error>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store; state is discarded on exit");
            Ok(Arc::new(EntityStore::in_memory()))
        }
        StoreBackend::Rocksdb => {
            let data_dir = config.data_dir();
            std::fs::create_dir_all(&data_dir)?;
            let rocksdb_path = format!("{}/rocksdb", data_dir);
            let backend = RocksBackend::open(&rocksdb_path)
                .map_err(|e| format!("Failed to open RocksDB at {}: {}", rocksdb_path, e))?;
            tracing::info!("Store opened at {}", rocksdb_path);
            Ok(Arc::new(EntityStore::new(Arc::new(backend))))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), RoostError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_identity(store: &EntityStore, pubkey: &str) -> Result<(), RoostError> {
    let identity = store
        .get::<Identity>(pubkey)?
        .ok_or_else(|| RoostError::NotFound(format!("identity {}", pubkey)))?;
    print_json(&identity)
}

pub fn print_room(store: &EntityStore, id: &str) -> Result<(), RoostError> {
    let room = store
        .get::<Room>(id)?
        .ok_or_else(|| RoostError::NotFound(format!("room {}", id)))?;
    print_json(&room)
}

pub fn print_profile(store: &EntityStore) -> Result<(), RoostError> {
    let profile = store
        .get::<UserProfile>(UserProfile::KEY)?
        .ok_or_else(|| RoostError::NotFound("local user profile".to_string()))?;
    print_json(&profile)
}

/// One line per route: score, observations, mode, url, evidence labels.
pub fn format_route(route: &Route) -> String {
    let types: Vec<&str> = route.types.iter().map(String::as_str).collect();
    format!(
        "{:.3}  {:>4}  {:<5}  {}  [{}]",
        route.score,
        route.count,
        route.mode,
        route.url,
        types.join(", ")
    )
}

pub fn print_routes(
    config: &DaemonConfig,
    store: Arc<EntityStore>,
    pubkey: &str,
    mode: Option<RouteMode>,
    limit: Option<usize>,
) -> Result<(), RoostError> {
    let engine = RouteEngine::new(store, config.reputation.clone());
    let routes = engine.ranked_routes(pubkey, mode, limit)?;
    if routes.is_empty() {
        tracing::info!("No routes known for {}", pubkey);
        return Ok(());
    }
    for route in &routes {
        println!("{}", format_route(route));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_format_route() {
        let mut route = Route::new("pk", "wss://relay.example.com", RouteMode::Write);
        route.score = 0.85;
        route.count = 3;
        route.types.insert("kind:3".to_string());
        route.types.insert("nip05".to_string());

        assert_eq!(
            format_route(&route),
            "0.850     3  write  wss://relay.example.com  [kind:3, nip05]"
        );
    }

    #[test]
    fn test_open_memory_store() {
        let config = DaemonConfig {
            backend: StoreBackend::Memory,
            ..Default::default()
        };
        let store = open_store(&config).unwrap();
        assert!(store.list::<Room>().unwrap().is_empty());
    }

    #[test]
    fn test_open_rocksdb_store_creates_data_dir() {
        let dir = std::env::temp_dir().join(format!("roost_daemon_test_{}", Uuid::now_v7()));
        let config = DaemonConfig {
            data_dir: dir.to_string_lossy().to_string(),
            ..Default::default()
        };
        let store = open_store(&config).unwrap();
        store
            .put(&Room {
                id: "r1".to_string(),
                name: Some("rust".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(store.get::<Room>("r1").unwrap().is_some());
        drop(store);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_identity_is_not_found() {
        let store = EntityStore::in_memory();
        assert!(matches!(
            print_identity(&store, "nobody"),
            Err(RoostError::NotFound(_))
        ));
    }
}
