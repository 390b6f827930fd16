// In-memory TTL cache shared by the price-check and currency-rate paths.
// Instances are owned by whoever builds the service, never module-level.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct CacheStats {
    pub items_count: AtomicUsize,
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
    pub eviction_count: AtomicUsize,
    pub expired_count: AtomicUsize,
    pub average_lookup_time_ns: AtomicU64,
    pub total_lookups: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheStatsReport {
    pub items_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub eviction_count: usize,
    pub expired_count: usize,
    pub average_lookup_time_ns: u64,
    pub total_lookups: usize,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub default_ttl: Duration,
    pub eviction_policy: EvictionPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            default_ttl: Duration::from_secs(300),
            eviction_policy: EvictionPolicy::OldestFirst,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvictionPolicy {
    LeastRecentlyUsed,
    OldestFirst,
}

struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
    last_accessed: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

pub struct TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    entries: DashMap<K, CacheEntry<V>>,
    config: RwLock<CacheConfig>,
    stats: CacheStats,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config: RwLock::new(config),
            stats: CacheStats::default(),
        }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(CacheConfig::with_ttl(ttl))
    }

    pub fn default_ttl(&self) -> Duration {
        self.config.read().default_ttl
    }

    // Returns a clone of the live value; an expired entry is removed and
    // counted as a miss
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        self.stats.total_lookups.fetch_add(1, Ordering::SeqCst);

        let expired = match self.entries.get_mut(key) {
            Some(mut entry) if !entry.is_expired() => {
                entry.last_accessed = Instant::now();
                self.stats.hit_count.fetch_add(1, Ordering::SeqCst);
                let value = entry.value.clone();
                drop(entry);
                self.store_lookup_time(now);
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.remove_entry(key, true);
        }
        self.stats.miss_count.fetch_add(1, Ordering::SeqCst);
        self.store_lookup_time(now);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        let ttl = self.default_ttl();
        self.insert_with_ttl(key, value, ttl);
    }

    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let max_entries = self.config.read().max_entries;
        if !self.entries.contains_key(&key) && self.entries.len() >= max_entries {
            self.purge_expired();
            if self.entries.len() >= max_entries {
                self.evict_one();
            }
        }

        let now = Instant::now();
        let entry = CacheEntry {
            value,
            created_at: now,
            ttl,
            last_accessed: now,
        };
        if self.entries.insert(key, entry).is_none() {
            self.stats.items_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn invalidate(&self, key: &K) -> bool {
        self.remove_entry(key, false)
    }

    pub fn invalidate_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&K) -> bool,
    {
        let keys: Vec<K> = self
            .entries
            .iter()
            .filter(|entry| predicate(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        keys.iter().filter(|key| self.remove_entry(key, false)).count()
    }

    pub fn purge_expired(&self) -> usize {
        let keys: Vec<K> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired())
            .map(|entry| entry.key().clone())
            .collect();
        keys.iter().filter(|key| self.remove_entry(key, true)).count()
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.stats.items_count.store(0, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set_eviction_policy(&self, policy: EvictionPolicy) {
        self.config.write().eviction_policy = policy;
    }

    pub fn stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            items_count: self.stats.items_count.load(Ordering::SeqCst),
            hit_count: self.stats.hit_count.load(Ordering::SeqCst),
            miss_count: self.stats.miss_count.load(Ordering::SeqCst),
            eviction_count: self.stats.eviction_count.load(Ordering::SeqCst),
            expired_count: self.stats.expired_count.load(Ordering::SeqCst),
            average_lookup_time_ns: self.stats.average_lookup_time_ns.load(Ordering::SeqCst),
            total_lookups: self.stats.total_lookups.load(Ordering::SeqCst),
        }
    }

    fn evict_one(&self) {
        let policy = self.config.read().eviction_policy;
        let victim = match policy {
            EvictionPolicy::LeastRecentlyUsed => self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().last_accessed)
                .map(|entry| entry.key().clone()),
            EvictionPolicy::OldestFirst => self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().created_at)
                .map(|entry| entry.key().clone()),
        };

        if let Some(key) = victim {
            if self.remove_entry(&key, false) {
                self.stats.eviction_count.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn remove_entry(&self, key: &K, expired: bool) -> bool {
        if self.entries.remove(key).is_none() {
            return false;
        }
        self.stats.items_count.fetch_sub(1, Ordering::SeqCst);
        if expired {
            self.stats.expired_count.fetch_add(1, Ordering::SeqCst);
        }
        true
    }

    fn store_lookup_time(&self, started: Instant) {
        let duration_ns = started.elapsed().as_nanos() as u64;
        let total_lookups = self.stats.total_lookups.load(Ordering::SeqCst) as u64;
        let current_avg = self.stats.average_lookup_time_ns.load(Ordering::SeqCst);

        let new_avg = if total_lookups <= 1 {
            duration_ns
        } else {
            (current_avg * (total_lookups - 1) + duration_ns) / total_lookups
        };

        self.stats
            .average_lookup_time_ns
            .store(new_avg, Ordering::SeqCst);
    }
}
