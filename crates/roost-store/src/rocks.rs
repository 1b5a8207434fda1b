// crates/roost-store/src/rocks.rs
//
// RocksDB-backed persistent storage for entity tables.
//
// Key format:
//   `{table}:{key}` -> JSON-serialized row
//
// e.g. `identity:{pubkey}`, `route:{route_id}`, `relay:{canonical_url}`.
// Table listing is a prefix scan over `{table}:`.

use rocksdb::{DBWithThreadMode, MultiThreaded, Options};

use roost_core::error::RoostError;
use roost_core::traits::{KeyValueBackend, Table};

/// RocksDB wrapper implementing the `KeyValueBackend` trait.
#[derive(Debug)]
pub struct RocksBackend {
    db: DBWithThreadMode<MultiThreaded>,
}

impl RocksBackend {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, RoostError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path)
            .map_err(|e| {
                RoostError::Storage(format!("Failed to open RocksDB at {}: {}", path, e))
            })?;

        Ok(Self { db })
    }

    /// Build the row key: `{table}:{key}`.
    fn row_key(table: Table, key: &str) -> Vec<u8> {
        format!("{}:{}", table.name(), key).into_bytes()
    }
}

impl KeyValueBackend for RocksBackend {
    fn get(&self, table: Table, key: &str) -> Result<Option<Vec<u8>>, RoostError> {
        self.db
            .get(Self::row_key(table, key))
            .map_err(|e| RoostError::Storage(format!("RocksDB get failed: {}", e)))
    }

    fn put(&self, table: Table, key: &str, value: &[u8]) -> Result<(), RoostError> {
        self.db
            .put(Self::row_key(table, key), value)
            .map_err(|e| RoostError::Storage(format!("RocksDB put failed: {}", e)))
    }

    fn scan(&self, table: Table) -> Result<Vec<Vec<u8>>, RoostError> {
        let prefix_str = format!("{}:", table.name());
        let prefix = prefix_str.as_bytes();
        let mut rows = Vec::new();

        for item in self.db.prefix_iterator(prefix) {
            let (key, value) = item
                .map_err(|e| RoostError::Storage(format!("RocksDB iteration error: {}", e)))?;

            // Without a prefix extractor the iterator runs past the prefix.
            if !key.starts_with(prefix) {
                break;
            }
            rows.push(value.to_vec());
        }

        Ok(rows)
    }
}
