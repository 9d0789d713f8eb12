//! Bounded TTL + LRU cache.
//!
//! `TtlCache` is an explicit, injectable service rather than a process-wide
//! singleton: constructed with a capacity and a TTL, driven by an explicit
//! `now` instant so tests control time the same way integration tests
//! control `entry_date`. Expired entries are evicted lazily on access;
//! capacity overflow evicts the least-recently-used entry, where a hit
//! counts as use.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use serde::Deserialize;

/// Capacities and TTLs for the ledger's cache instances.
///
/// Loadable from `config/ledger.toml` and the `LEDGER_*` environment, with
/// the defaults below (list/record TTL 5 minutes, category TTL 10 minutes;
/// categories change less).
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub list_capacity: usize,
    pub list_ttl_secs: u64,
    pub record_capacity: usize,
    pub record_ttl_secs: u64,
    pub category_capacity: usize,
    pub category_ttl_secs: u64,
    pub balance_capacity: usize,
    pub balance_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            list_capacity: 512,
            list_ttl_secs: 5 * 60,
            record_capacity: 100,
            record_ttl_secs: 5 * 60,
            category_capacity: 20,
            category_ttl_secs: 10 * 60,
            balance_capacity: 128,
            balance_ttl_secs: 5 * 60,
        }
    }
}

impl CacheConfig {
    const DEFAULT_CONFIG_PATH: &'static str = "config/ledger.toml";

    /// Loads the config from the optional TOML file and `LEDGER_*`
    /// environment overrides, falling back to the defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(Self::DEFAULT_CONFIG_PATH).required(false))
            .add_source(config::Environment::with_prefix("LEDGER"));
        builder.build()?.try_deserialize()
    }
}

/// Hit/miss counters, exposed for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    last_used: u64,
}

pub struct TtlCache<K, V> {
    capacity: usize,
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
    tick: u64,
    stats: CacheStats,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            entries: HashMap::new(),
            tick: 0,
            stats: CacheStats::default(),
        }
    }

    /// Returns the cached value if present and fresh. An expired entry is
    /// removed here rather than by any background sweep.
    pub fn get(&mut self, key: &K, now: Instant) -> Option<V> {
        let fresh = match self.entries.get(key) {
            Some(entry) => now.saturating_duration_since(entry.inserted_at) < self.ttl,
            None => {
                self.stats.misses += 1;
                return None;
            }
        };

        if !fresh {
            self.entries.remove(key);
            self.stats.misses += 1;
            return None;
        }

        self.tick += 1;
        let tick = self.tick;
        self.stats.hits += 1;
        self.entries.get_mut(key).map(|entry| {
            entry.last_used = tick;
            entry.value.clone()
        })
    }

    /// Stores a value with a fresh timestamp, evicting the least recently
    /// used entry if the cache is over capacity.
    pub fn insert(&mut self, key: K, value: V, now: Instant) {
        self.tick += 1;
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
                last_used: self.tick,
            },
        );

        while self.entries.len() > self.capacity {
            // Linear scan; capacities here are two or three digits.
            let lru = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            match lru {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize, ttl_secs: u64) -> TtlCache<&'static str, i32> {
        TtlCache::new(capacity, Duration::from_secs(ttl_secs))
    }

    #[test]
    fn entry_expires_after_ttl() {
        let mut cache = cache(10, 300);
        let t0 = Instant::now();
        cache.insert("a", 1, t0);

        assert_eq!(cache.get(&"a", t0 + Duration::from_secs(299)), Some(1));
        assert_eq!(cache.get(&"a", t0 + Duration::from_secs(300)), None);
        // Expired entry was removed lazily on access.
        assert!(cache.is_empty());
    }

    #[test]
    fn eviction_is_lru_not_fifo() {
        let mut cache = cache(2, 300);
        let t0 = Instant::now();
        cache.insert("a", 1, t0);
        cache.insert("b", 2, t0);

        // Touch the older entry, making "b" the LRU.
        assert_eq!(cache.get(&"a", t0), Some(1));
        cache.insert("c", 3, t0);

        assert_eq!(cache.get(&"a", t0), Some(1));
        assert_eq!(cache.get(&"b", t0), None);
        assert_eq!(cache.get(&"c", t0), Some(3));
    }

    #[test]
    fn invalidate_removes_single_key() {
        let mut cache = cache(10, 300);
        let t0 = Instant::now();
        cache.insert("a", 1, t0);
        cache.insert("b", 2, t0);

        cache.invalidate(&"a");
        assert_eq!(cache.get(&"a", t0), None);
        assert_eq!(cache.get(&"b", t0), Some(2));
    }

    #[test]
    fn stats_count_hits_and_misses() {
        let mut cache = cache(10, 300);
        let t0 = Instant::now();
        assert_eq!(cache.get(&"a", t0), None);
        cache.insert("a", 1, t0);
        assert_eq!(cache.get(&"a", t0), Some(1));

        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let mut cache = cache(0, 300);
        let t0 = Instant::now();
        cache.insert("a", 1, t0);
        assert_eq!(cache.len(), 1);
    }
}
