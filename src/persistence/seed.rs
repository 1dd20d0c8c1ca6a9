//! JSON seed files
//!
//! A seed directory holds one JSON array per collection: `users.json`,
//! `managers.json`, `direct_reports.json` and `photos.json`. A missing file
//! is an empty collection.

use crate::org::{DirectReportLink, Employee, InMemoryRecordStore, ManagerLink, PhotoRecord};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const USERS_FILE: &str = "users.json";
pub const MANAGERS_FILE: &str = "managers.json";
pub const DIRECT_REPORTS_FILE: &str = "direct_reports.json";
pub const PHOTOS_FILE: &str = "photos.json";

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Seed directory not found: {0}")]
    MissingDir(PathBuf),
}

pub type SeedResult<T> = Result<T, SeedError>;

/// Contents of the four org collections
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub users: Vec<Employee>,
    pub managers: Vec<ManagerLink>,
    pub direct_reports: Vec<DirectReportLink>,
    pub photos: Vec<PhotoRecord>,
}

impl SeedData {
    /// Read every collection file under `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> SeedResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(SeedError::MissingDir(dir.to_path_buf()));
        }

        let seed = SeedData {
            users: read_collection(&dir.join(USERS_FILE))?,
            managers: read_collection(&dir.join(MANAGERS_FILE))?,
            direct_reports: read_collection(&dir.join(DIRECT_REPORTS_FILE))?,
            photos: read_collection(&dir.join(PHOTOS_FILE))?,
        };

        info!(
            "Loaded seed data from {}: {} users, {} manager links, {} report links, {} photos",
            dir.display(),
            seed.users.len(),
            seed.managers.len(),
            seed.direct_reports.len(),
            seed.photos.len()
        );
        Ok(seed)
    }
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> SeedResult<Vec<T>> {
    if !path.exists() {
        debug!("{} not present, empty collection", path.display());
        return Ok(Vec::new());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl From<SeedData> for InMemoryRecordStore {
    fn from(seed: SeedData) -> Self {
        let mut store = InMemoryRecordStore::new();
        for user in seed.users {
            store.insert_user(user);
        }
        for link in seed.managers {
            store.insert_manager_link(link);
        }
        for link in seed.direct_reports {
            store.insert_direct_report_link(link);
        }
        for photo in seed.photos {
            store.insert_photo(photo);
        }
        store
    }
}
