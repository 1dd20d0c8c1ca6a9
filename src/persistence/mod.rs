//! Persistence layer for the org collections
//!
//! - JSON seed files exported by the directory ingestion job
//! - RocksDB storage with one column family per collection

pub mod seed;
pub mod storage;

pub use seed::{SeedData, SeedError, SeedResult};
pub use storage::{PersistentRecordStore, StorageError, StorageResult};

use crate::config::{StoreBackend, StoreConfig};
use crate::org::{InMemoryRecordStore, RecordStore};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Open the record store described by `config`
///
/// The in-memory backend is filled from the seed directory (empty without
/// one). The RocksDB backend imports the seed directory, when set, on top
/// of what is already stored.
pub fn open_record_store(config: &StoreConfig) -> Result<Arc<dyn RecordStore>, PersistenceError> {
    let seed = match &config.seed_dir {
        Some(dir) => Some(SeedData::from_dir(dir)?),
        None => None,
    };

    match config.backend {
        StoreBackend::Memory => {
            let store = InMemoryRecordStore::from(seed.unwrap_or_default());
            info!("Using in-memory record store with {} users", store.user_count());
            Ok(Arc::new(store))
        }
        StoreBackend::Rocksdb => {
            std::fs::create_dir_all(&config.path)?;
            let store = PersistentRecordStore::open(&config.path)?;
            if let Some(seed) = &seed {
                store.import(seed)?;
                store.flush()?;
            }
            Ok(Arc::new(store))
        }
    }
}

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
