//! Geocode result cache
//!
//! Entries live in memory and are persisted as one JSON document per
//! namespace through a [`CacheBackend`]. A `None` entry records a lookup
//! that found nothing, so the provider is not asked again.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::RwLock;

use tracing::{debug, warn};
use whereat::Location;

use super::{Coordinates, GeoError, GeoResult};

/// Versioned storage slot; bump the suffix when the key format changes
pub const CACHE_NAMESPACE: &str = "geocode_cache_v2";

/// Normalized cache key for an address
///
/// Street, city, state, postal code and country, lower-cased and trimmed,
/// empty parts skipped, joined by `|`.
pub fn cache_key(location: &Location) -> String {
    [
        &location.street,
        &location.city,
        &location.state,
        &location.postal_code,
        &location.country_or_region,
    ]
    .into_iter()
    .filter_map(|part| part.as_deref())
    .filter(|part| !part.is_empty())
    .map(|part| part.to_lowercase().trim().to_string())
    .collect::<Vec<_>>()
    .join("|")
}

/// Key-value slot storage for serialized caches
pub trait CacheBackend: Send + Sync {
    fn read(&self, namespace: &str) -> GeoResult<Option<String>>;
    fn write(&self, namespace: &str, contents: &str) -> GeoResult<()>;
    fn remove(&self, namespace: &str) -> GeoResult<()>;
}

/// Process-local backend, mostly for tests
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> GeoError {
    GeoError::Backend("memory backend lock poisoned".to_string())
}

impl CacheBackend for MemoryBackend {
    fn read(&self, namespace: &str) -> GeoResult<Option<String>> {
        Ok(self.slots.read().map_err(poisoned)?.get(namespace).cloned())
    }

    fn write(&self, namespace: &str, contents: &str) -> GeoResult<()> {
        self.slots
            .write()
            .map_err(poisoned)?
            .insert(namespace.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, namespace: &str) -> GeoResult<()> {
        self.slots.write().map_err(poisoned)?.remove(namespace);
        Ok(())
    }
}

/// One `<namespace>.json` file per slot under a directory
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{}.json", namespace))
    }
}

impl CacheBackend for JsonFileBackend {
    fn read(&self, namespace: &str) -> GeoResult<Option<String>> {
        match fs::read_to_string(self.path(namespace)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, namespace: &str, contents: &str) -> GeoResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(namespace), contents)?;
        Ok(())
    }

    fn remove(&self, namespace: &str) -> GeoResult<()> {
        match fs::remove_file(self.path(namespace)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub size: usize,
    pub entries: Vec<String>,
}

pub struct GeocodeCache {
    backend: Box<dyn CacheBackend>,
    entries: HashMap<String, Option<Coordinates>>,
}

impl GeocodeCache {
    /// Empty cache over a backend; call [`GeocodeCache::load`] to restore it
    pub fn new(backend: impl CacheBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            entries: HashMap::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Replace the entries with the persisted copy, if any
    ///
    /// Backend failures are logged and leave the cache unchanged.
    pub fn load(&mut self) {
        let stored = match self.backend.read(CACHE_NAMESPACE) {
            Ok(Some(stored)) => stored,
            Ok(None) => return,
            Err(e) => {
                warn!("Failed to read geocode cache: {}", e);
                return;
            }
        };
        match serde_json::from_str::<HashMap<String, Option<Coordinates>>>(&stored) {
            Ok(entries) => {
                debug!("Loaded {} geocode cache entries", entries.len());
                self.entries = entries;
            }
            Err(e) => warn!("Ignoring malformed geocode cache: {}", e),
        }
    }

    /// Persist the entries; failures are logged
    pub fn save(&self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(GeoError::from)
            .and_then(|json| self.backend.write(CACHE_NAMESPACE, &json));
        if let Err(e) = result {
            warn!("Failed to save geocode cache: {}", e);
        }
    }

    /// Drop all entries, in memory and persisted
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.backend.remove(CACHE_NAMESPACE) {
            warn!("Failed to clear geocode cache: {}", e);
        }
    }

    /// `Some(None)` is a cached miss; `None` means never looked up
    pub fn get(&self, key: &str) -> Option<Option<Coordinates>> {
        self.entries.get(key).copied()
    }

    pub fn insert(&mut self, key: impl Into<String>, coordinates: Option<Coordinates>) {
        self.entries.insert(key.into(), coordinates);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let mut entries: Vec<String> = self.entries.keys().cloned().collect();
        entries.sort();
        CacheStats {
            size: entries.len(),
            entries,
        }
    }
}
