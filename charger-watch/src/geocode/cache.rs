//! Caching layer for geocoder lookups.
//!
//! Users repeat the same search text while adjusting the radius or toggling
//! polling, so successful lookups are cached for a while. Failures are not
//! cached; the next search retries.

use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::Coordinate;

use super::Geocoder;
use super::error::GeocodeError;

/// Configuration for the geocode cache.
#[derive(Debug, Clone)]
pub struct GeocodeCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for GeocodeCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            max_capacity: 1000,
        }
    }
}

/// Geocoder with caching.
///
/// Wraps any `Geocoder` and caches successful lookups by normalised text.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: MokaCache<String, Coordinate>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G, config: &GeocodeCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, cache }
    }

    /// Access the wrapped geocoder.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }
}

/// Cache key: lowercase, single-spaced, trimmed.
fn cache_key(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn geocode(&self, text: &str) -> Result<Coordinate, GeocodeError> {
        let key = cache_key(text);

        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let coordinate = self.inner.geocode(text).await?;
        self.cache.insert(key, coordinate).await;
        Ok(coordinate)
    }
}
