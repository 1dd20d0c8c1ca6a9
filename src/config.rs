//! Server configuration
//!
//! Loaded from an optional YAML file named by `WHEREAT_CONFIG`, then
//! overridden by environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::org::MAX_CHAIN_DEPTH;

pub const CONFIG_PATH_VAR: &str = "WHEREAT_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub org: OrgConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    pub port: u16,
    /// Allowed CORS origin; any origin when unset
    pub client_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 3001,
            client_origin: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Rocksdb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory of JSON seed files, loaded at startup when set
    pub seed_dir: Option<PathBuf>,
    /// RocksDB data directory
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            seed_dir: None,
            path: PathBuf::from("./whereat_data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgConfig {
    pub max_chain_depth: usize,
}

impl Default for OrgConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: MAX_CHAIN_DEPTH,
        }
    }
}

impl AppConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// File named by `WHEREAT_CONFIG` (defaults otherwise) plus env overrides
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => {
                info!("Loading configuration from {}", path);
                Self::from_yaml_file(path)?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Apply `PORT`, `CLIENT_URL`, `WHEREAT_SEED_DIR` and `WHEREAT_DATA_DIR`
    ///
    /// Setting `WHEREAT_DATA_DIR` selects the RocksDB backend.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidVar { var: "PORT", value: port })?;
        }
        if let Some(origin) = lookup("CLIENT_URL").filter(|o| !o.is_empty()) {
            self.server.client_origin = Some(origin);
        }
        if let Some(dir) = lookup("WHEREAT_SEED_DIR").filter(|d| !d.is_empty()) {
            self.store.seed_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup("WHEREAT_DATA_DIR").filter(|d| !d.is_empty()) {
            self.store.path = PathBuf::from(dir);
            self.store.backend = StoreBackend::Rocksdb;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.address, self.server.port)
    }
}
