//! Caching layer for route geometry.
//!
//! Street geometry between two fixed points rarely changes, and a single trip
//! asks for the same walk and ride legs every time it is re-planned. We cache
//! successful responses only; a failed lookup is retried on the next request.
//!
//! Coordinates are quantized to 1e-6 degrees (about 11 cm) so keys are exact
//! integers rather than floats.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::Coord;
use crate::geo::{GeoError, GeometryProvider, Profile};

/// Quantization steps per degree.
const STEPS_PER_DEGREE: f64 = 1e6;

/// A coordinate as integer micro-degrees.
type QuantizedCoord = (i64, i64);

/// Cache key for geometry: (start, end, profile).
type GeometryKey = (QuantizedCoord, QuantizedCoord, Profile);

/// Cached path.
type GeometryEntry = Arc<Vec<Coord>>;

fn quantize(coord: Coord) -> QuantizedCoord {
    (
        (coord.lat() * STEPS_PER_DEGREE).round() as i64,
        (coord.lng() * STEPS_PER_DEGREE).round() as i64,
    )
}

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            max_capacity: 10_000,
        }
    }
}

/// Cache of provider geometry.
pub struct GeometryCache {
    paths: MokaCache<GeometryKey, GeometryEntry>,
}

impl GeometryCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let paths = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { paths }
    }

    fn key(from: Coord, to: Coord, profile: Profile) -> GeometryKey {
        (quantize(from), quantize(to), profile)
    }

    pub async fn get(&self, key: &GeometryKey) -> Option<GeometryEntry> {
        self.paths.get(key).await
    }

    pub async fn insert(&self, key: GeometryKey, entry: GeometryEntry) {
        self.paths.insert(key, entry).await;
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.paths.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.paths.invalidate_all();
    }
}

/// Geometry provider with caching.
///
/// Wraps any [`GeometryProvider`] and memoizes successful paths.
pub struct CachedGeometryProvider<P> {
    provider: P,
    cache: GeometryCache,
}

impl<P: GeometryProvider> CachedGeometryProvider<P> {
    /// Create a new cached provider.
    pub fn new(provider: P, cache_config: &CacheConfig) -> Self {
        Self {
            provider,
            cache: GeometryCache::new(cache_config),
        }
    }

    /// Access the underlying provider for lookups that bypass the cache.
    pub fn provider(&self) -> &P {
        &self.provider
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

impl<P: GeometryProvider> GeometryProvider for CachedGeometryProvider<P> {
    async fn route(&self, from: Coord, to: Coord, profile: Profile) -> Result<Vec<Coord>, GeoError> {
        let key = GeometryCache::key(from, to, profile);

        if let Some(cached) = self.cache.get(&key).await {
            trace!(?profile, "geometry cache hit");
            return Ok(cached.as_ref().clone());
        }

        let path = self.provider.route(from, to, profile).await?;
        self.cache.insert(key, Arc::new(path.clone())).await;

        Ok(path)
    }
}
