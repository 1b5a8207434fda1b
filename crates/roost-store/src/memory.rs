// crates/roost-store/src/memory.rs
//
// In-memory backend implementing `KeyValueBackend`.
//
// Used by tests and by the daemon's `--memory` mode. Nothing survives
// process exit.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use roost_core::error::RoostError;
use roost_core::traits::{KeyValueBackend, Table};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<Table, BTreeMap<String, Vec<u8>>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, table: Table, key: &str) -> Result<Option<Vec<u8>>, RoostError> {
        let tables = self
            .tables
            .read()
            .map_err(|e| RoostError::Storage(format!("RwLock poisoned: {}", e)))?;
        Ok(tables.get(&table).and_then(|rows| rows.get(key)).cloned())
    }

    fn put(&self, table: Table, key: &str, value: &[u8]) -> Result<(), RoostError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| RoostError::Storage(format!("RwLock poisoned: {}", e)))?;
        tables
            .entry(table)
            .or_default()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn scan(&self, table: Table) -> Result<Vec<Vec<u8>>, RoostError> {
        let tables = self
            .tables
            .read()
            .map_err(|e| RoostError::Storage(format!("RwLock poisoned: {}", e)))?;
        Ok(tables
            .get(&table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_isolated() {
        let backend = MemoryBackend::new();
        backend.put(Table::Rooms, "k", b"room").unwrap();
        backend.put(Table::Identities, "k", b"identity").unwrap();

        let room = backend.get(Table::Rooms, "k").unwrap();
        assert_eq!(room, Some(b"room".to_vec()));
        assert_eq!(backend.scan(Table::Identities).unwrap().len(), 1);
        assert!(backend.scan(Table::Routes).unwrap().is_empty());
    }

    #[test]
    fn test_put_replaces() {
        let backend = MemoryBackend::new();
        backend.put(Table::Relays, "u", b"1").unwrap();
        backend.put(Table::Relays, "u", b"2").unwrap();
        assert_eq!(backend.scan(Table::Relays).unwrap(), vec![b"2".to_vec()]);
    }
}
