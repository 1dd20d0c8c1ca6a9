//! Geocoding for map markers
//!
//! Turns employee office addresses into coordinates through a provider
//! (Azure Maps), with a persistent cache in front of it and a static table
//! of well-known cities as a fallback.

mod cache;
mod cities;
mod client;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::{cache_key, CacheBackend, CacheStats, GeocodeCache, JsonFileBackend, MemoryBackend, CACHE_NAMESPACE};
pub use cities::city_coordinates;
pub use client::{
    best_match, country_code, geocode_query, AddressMatch, AzureMapsGeocoder, GeocodeProvider, GeocodingService,
    AZURE_MAPS_KEY_VAR,
};

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Geocoding API returned status {0}")]
    Status(u16),

    #[error("Cache backend unavailable: {0}")]
    Backend(String),
}

pub type GeoResult<T> = Result<T, GeoError>;

/// WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }
}
