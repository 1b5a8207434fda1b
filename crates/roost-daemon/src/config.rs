// crates/roost-daemon/src/config.rs
//
// Runtime configuration for the Roost daemon.
// Loaded from a TOML file or populated with defaults.

use serde::Deserialize;
use std::fs;

use roost_ingest::IngestConfig;
use roost_reputation::ReputationConfig;
use roost_verify::VerifyConfig;

/// Which key-value backend holds the entity tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Rocksdb,
    Memory,
}

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Directory for local data storage (RocksDB).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub backend: StoreBackend,

    /// Hex public key of the local user. Events by this key are archived
    /// and shape the user profile.
    #[serde(default)]
    pub local_pubkey: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub reputation: ReputationConfig,

    #[serde(default)]
    pub verify: VerifyConfig,
}

fn default_data_dir() -> String {
    "~/.roost/data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: StoreBackend::default(),
            local_pubkey: None,
            log_level: default_log_level(),
            ingest: IngestConfig::default(),
            reputation: ReputationConfig::default(),
            verify: VerifyConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(expand_tilde(path))?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// `data_dir` with a leading `~/` resolved.
    pub fn data_dir(&self) -> String {
        expand_tilde(&self.data_dir)
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
