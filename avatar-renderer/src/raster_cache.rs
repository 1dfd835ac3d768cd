//! Cache of decoded asset rasters.
//!
//! Catalog assets are static, so each URL only needs decoding once per
//! session. Rasters share their pixel buffer, so a hit is a reference-count
//! bump rather than a copy.

use std::collections::HashMap;

use avatar_core::Raster;

#[derive(Debug)]
struct CacheEntry {
    raster: Raster,
    /// Logical clock value of the last access, for LRU ordering.
    last_used: u64,
}

/// Limits for the raster cache.
#[derive(Debug, Clone)]
pub struct RasterCacheConfig {
    /// Maximum total pixel bytes held.
    pub max_size_bytes: usize,
    /// Maximum number of entries.
    pub max_entries: usize,
}

impl Default for RasterCacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 64 * 1024 * 1024, // 64 MB
            max_entries: 64,
        }
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of evictions.
    pub evictions: u64,
}

/// LRU cache of decoded rasters keyed by asset URL.
#[derive(Debug, Default)]
pub struct RasterCache {
    entries: HashMap<String, CacheEntry>,
    config: RasterCacheConfig,
    current_size: usize,
    clock: u64,
    stats: CacheStats,
}

impl RasterCache {
    /// Create a cache with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RasterCacheConfig::default())
    }

    /// Create a cache with custom limits.
    #[must_use]
    pub fn with_config(config: RasterCacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            current_size: 0,
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Look up a raster, counting a hit or a miss.
    pub fn get(&mut self, key: &str) -> Option<Raster> {
        let now = self.tick();
        if let Some(entry) = self.entries.get_mut(key) {
            entry.last_used = now;
            self.stats.hits += 1;
            Some(entry.raster.clone())
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Insert a raster, evicting least recently used entries to fit.
    ///
    /// A raster larger than the whole budget is not cached.
    pub fn insert(&mut self, key: impl Into<String>, raster: Raster) {
        let key = key.into();
        let size = raster.size_bytes();

        if let Some(old) = self.entries.remove(&key) {
            self.current_size -= old.raster.size_bytes();
        }

        if size > self.config.max_size_bytes {
            tracing::debug!("Not caching {key}: {size} bytes exceeds cache budget");
            return;
        }

        while !self.entries.is_empty()
            && (self.current_size + size > self.config.max_size_bytes
                || self.entries.len() >= self.config.max_entries)
        {
            self.evict_lru();
        }

        let now = self.tick();
        self.current_size += size;
        self.entries.insert(
            key,
            CacheEntry {
                raster,
                last_used: now,
            },
        );
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());

        if let Some(entry) = oldest.and_then(|key| self.entries.remove(&key)) {
            self.current_size -= entry.raster.size_bytes();
            self.stats.evictions += 1;
        }
    }

    /// Check if a key is cached without touching its recency.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_size = 0;
    }

    /// Number of cached rasters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total pixel bytes held.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.current_size
    }

    /// Hit/miss/eviction counters.
    #[must_use]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(side: u32) -> Raster {
        Raster::solid(side, side, [255, 0, 0, 255])
    }

    #[test]
    fn test_cache_insert_and_get() {
        let mut cache = RasterCache::new();
        let original = raster(10);
        cache.insert("/0g_glasses.png", original.clone());

        let hit = cache.get("/0g_glasses.png").expect("cached");
        assert!(hit.shares_pixels(&original));
        assert_eq!(cache.size_bytes(), 400);
    }

    #[test]
    fn test_cache_miss_counts() {
        let mut cache = RasterCache::new();
        assert!(cache.get("/missing.png").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_oversized_raster_is_not_cached() {
        let mut cache = RasterCache::with_config(RasterCacheConfig {
            max_size_bytes: 1000,
            max_entries: 10,
        });
        cache.insert("big", raster(20)); // 1600 bytes
        assert!(!cache.contains("big"));
        assert_eq!(cache.size_bytes(), 0);
    }

    #[test]
    fn test_eviction_by_count_prefers_lru() {
        let mut cache = RasterCache::with_config(RasterCacheConfig {
            max_size_bytes: 1024 * 1024,
            max_entries: 2,
        });
        cache.insert("a", raster(2));
        cache.insert("b", raster(2));
        let _ = cache.get("a");
        cache.insert("c", raster(2));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_eviction_by_size() {
        let mut cache = RasterCache::with_config(RasterCacheConfig {
            max_size_bytes: 40,
            max_entries: 10,
        });
        cache.insert("a", raster(2)); // 16 bytes
        cache.insert("b", raster(2));
        cache.insert("c", raster(2));
        assert!(!cache.contains("a"));
        assert!(cache.size_bytes() <= 40);
    }

    #[test]
    fn test_reinsert_replaces_size() {
        let mut cache = RasterCache::new();
        cache.insert("a", raster(2));
        cache.insert("a", raster(4));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.size_bytes(), 64);
    }

    #[test]
    fn test_cache_clear() {
        let mut cache = RasterCache::new();
        cache.insert("a", raster(2));
        cache.insert("b", raster(2));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.size_bytes(), 0);
    }
}
