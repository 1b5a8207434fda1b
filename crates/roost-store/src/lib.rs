// crates/roost-store/src/lib.rs
//
// roost-store: Entity Store for Roost.
//
// Provides a RocksDB-backed persistent backend, an in-memory backend for
// tests and ephemeral runs, and `EntityStore`, the typed table layer that
// serializes rows and applies partial patches atomically per entity key.

pub mod entity_store;
pub mod memory;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use entity_store::EntityStore;
pub use memory::MemoryBackend;
pub use rocks::RocksBackend;
