//! Address geocoding through Azure Maps

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use whereat::Location;

use super::cache::{cache_key, GeocodeCache};
use super::{Coordinates, GeoError, GeoResult};

/// Environment variable holding the Azure Maps subscription key
pub const AZURE_MAPS_KEY_VAR: &str = "AZURE_MAPS_KEY";

const AZURE_MAPS_URL: &str = "https://atlas.microsoft.com";

/// One candidate returned by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct AddressMatch {
    pub position: Coordinates,
    /// State code, e.g. "WA"
    pub country_subdivision: Option<String>,
    /// State name, e.g. "Washington"
    pub country_subdivision_name: Option<String>,
}

#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Candidates for a free-form address, optionally limited to one ISO country
    async fn search(&self, query: &str, country_set: Option<&str>) -> GeoResult<Vec<AddressMatch>>;
}

/// ISO 3166 alpha-2 code for a country name as it appears in the directory
pub fn country_code(country: &str) -> Option<&'static str> {
    let code = match country.trim().to_lowercase().as_str() {
        "united states" | "usa" | "us" | "united states of america" => "US",
        "canada" => "CA",
        "united kingdom" | "uk" => "GB",
        "germany" => "DE",
        "france" => "FR",
        "spain" => "ES",
        "italy" => "IT",
        "netherlands" => "NL",
        "australia" => "AU",
        "japan" => "JP",
        "china" => "CN",
        "india" => "IN",
        "singapore" => "SG",
        "ireland" => "IE",
        "sweden" => "SE",
        "switzerland" => "CH",
        "brazil" => "BR",
        "mexico" => "MX",
        "south korea" => "KR",
        "israel" => "IL",
        "uae" | "united arab emirates" => "AE",
        _ => return None,
    };
    Some(code)
}

/// Free-form query: every non-empty address part, comma separated
pub fn geocode_query(location: &Location) -> String {
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
    .collect::<Vec<_>>()
    .join(", ")
}

/// Prefer the first candidate in the requested state, else the first one
pub fn best_match<'a>(matches: &'a [AddressMatch], state: Option<&str>) -> Option<&'a AddressMatch> {
    let first = matches.first()?;
    let Some(state) = state.map(str::to_lowercase).filter(|s| !s.is_empty()) else {
        return Some(first);
    };
    if matches.len() == 1 {
        return Some(first);
    }

    let in_state = |m: &&AddressMatch| {
        [&m.country_subdivision, &m.country_subdivision_name]
            .into_iter()
            .map(|s| s.as_deref().unwrap_or_default().to_lowercase())
            .any(|s| s == state || s.contains(&state) || state.contains(&s))
    };
    matches.iter().find(in_state).or(Some(first))
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    position: Position,
    #[serde(default)]
    address: SearchAddress,
}

#[derive(Deserialize)]
struct Position {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SearchAddress {
    country_subdivision: Option<String>,
    country_subdivision_name: Option<String>,
}

/// Azure Maps search-address API
pub struct AzureMapsGeocoder {
    http_client: Client,
    base_url: String,
    subscription_key: String,
}

impl AzureMapsGeocoder {
    pub fn new(subscription_key: impl Into<String>) -> Self {
        Self::with_base_url(AZURE_MAPS_URL, subscription_key)
    }

    pub fn with_base_url(base_url: &str, subscription_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            subscription_key: subscription_key.into(),
        }
    }

    /// Key from `AZURE_MAPS_KEY`, empty when unset
    pub fn from_env() -> Self {
        Self::new(std::env::var(AZURE_MAPS_KEY_VAR).unwrap_or_default())
    }

    fn search_url(&self, query: &str, country_set: Option<&str>) -> String {
        let mut url = format!(
            "{}/search/address/json?api-version=1.0&subscription-key={}&query={}",
            self.base_url,
            utf8_percent_encode(&self.subscription_key, NON_ALPHANUMERIC),
            utf8_percent_encode(query, NON_ALPHANUMERIC),
        );
        if let Some(code) = country_set {
            url.push_str("&countrySet=");
            url.push_str(code);
        }
        url
    }
}

#[async_trait]
impl GeocodeProvider for AzureMapsGeocoder {
    async fn search(&self, query: &str, country_set: Option<&str>) -> GeoResult<Vec<AddressMatch>> {
        let response = self.http_client.get(self.search_url(query, country_set)).send().await?;
        if !response.status().is_success() {
            return Err(GeoError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&body)?;
        Ok(parsed
            .results
            .into_iter()
            .map(|r| AddressMatch {
                position: Coordinates::new(r.position.lon, r.position.lat),
                country_subdivision: r.address.country_subdivision,
                country_subdivision_name: r.address.country_subdivision_name,
            })
            .collect())
    }
}

/// Cached geocoder used by the map view
pub struct GeocodingService<P> {
    provider: P,
    cache: Mutex<GeocodeCache>,
}

impl<P: GeocodeProvider> GeocodingService<P> {
    /// Wrap a provider; the cache is loaded from its backend immediately
    pub fn new(provider: P, mut cache: GeocodeCache) -> Self {
        cache.load();
        Self {
            provider,
            cache: Mutex::new(cache),
        }
    }

    fn geocodable(location: &Location) -> bool {
        let present = |part: &Option<String>| part.as_deref().is_some_and(|s| !s.is_empty());
        present(&location.city) || present(&location.street) || present(&location.postal_code)
    }

    /// Coordinates for an address, asking the provider on a cache miss
    ///
    /// Provider failures and empty results are cached as misses.
    pub async fn geocode(&self, location: &Location) -> Option<Coordinates> {
        if !Self::geocodable(location) {
            return None;
        }

        let key = cache_key(location);
        if let Some(cached) = self.cache.lock().await.get(&key) {
            debug!("Geocode cache hit: {}", key);
            return cached;
        }

        let query = geocode_query(location);
        let country = location.country_or_region.as_deref().and_then(country_code);
        info!("Geocoding: {}", query);

        let coordinates = match self.provider.search(&query, country).await {
            Ok(matches) => match best_match(&matches, location.state.as_deref()) {
                Some(found) => Some(found.position),
                None => {
                    warn!("No geocoding results for: {}", query);
                    None
                }
            },
            Err(e) => {
                error!("Geocoding error for {}: {}", query, e);
                None
            }
        };

        let mut cache = self.cache.lock().await;
        cache.insert(key, coordinates);
        cache.save();
        coordinates
    }

    /// Cached coordinates only; never calls the provider
    pub async fn cached(&self, location: &Location) -> Option<Coordinates> {
        if !Self::geocodable(location) {
            return None;
        }
        self.cache.lock().await.get(&cache_key(location)).flatten()
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn cache_stats(&self) -> super::CacheStats {
        self.cache.lock().await.stats()
    }
}
