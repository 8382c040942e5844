//! Bounded LRU fallback cache with TTL.

use crate::entry::{CacheEntry, CacheStats};
use crate::events::{CacheEvent, EvictionReason};
use lru::LruCache;
use sidecar_core::EventListeners;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Configuration for the fallback cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries. The least-recently-used entry is evicted
    /// to make room for a new key once this is reached.
    pub max_size: usize,
    /// Default TTL used by `Set` and `Prewarm`.
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            default_ttl: Duration::from_secs(3600),
        }
    }
}

struct CacheState {
    entries: LruCache<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

impl CacheState {
    fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(100).unwrap());
        Self {
            entries: LruCache::new(cap),
            hits: 0,
            misses: 0,
        }
    }
}

/// Bounded LRU map from `service:operation` to a response envelope,
/// with per-entry TTL expiry.
///
/// A `Get` observing an entry after a `Set` of the same key always
/// observes that `Set`'s data: both are serialized through a single
/// mutex (single-writer, copy-on-read semantics).
pub struct FallbackCache {
    state: Mutex<CacheState>,
    config: CacheConfig,
    listeners: EventListeners<CacheEvent>,
}

fn make_key(service: &str, operation: &str) -> String {
    format!("{service}:{operation}")
}

impl FallbackCache {
    /// Creates a new cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            state: Mutex::new(CacheState::new(config.max_size)),
            config,
            listeners: EventListeners::new(),
        }
    }

    /// Creates a cache with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Registers an event listener for cache hits/misses/evictions.
    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: sidecar_core::EventListener<CacheEvent> + 'static,
    {
        self.listeners.add(listener);
    }

    /// Stores `data` under `service:operation` using the configured
    /// default TTL.
    pub fn set(&self, service: &str, operation: &str, data: Vec<u8>) {
        self.set_with_ttl(service, operation, data, self.config.default_ttl);
    }

    /// Stores `data` under `service:operation` with an explicit TTL.
    ///
    /// If the cache is at capacity and this is a new key, the
    /// least-recently-used entry is evicted to make room. The key
    /// always ends up most-recently-used.
    pub fn set_with_ttl(&self, service: &str, operation: &str, data: Vec<u8>, ttl: Duration) {
        let key = make_key(service, operation);
        let now = Instant::now();
        let mut state = self.state.lock().unwrap();

        let entry = CacheEntry::new(key.clone(), data, ttl, now);
        if let Some((evicted_key, _)) = state.entries.push(key.clone(), entry) {
            if evicted_key != key {
                self.emit(CacheEvent::Eviction {
                    key: evicted_key,
                    reason: EvictionReason::Capacity,
                    timestamp: now,
                });
            }
        }
    }

    /// Equivalent to `set` with the default TTL; intended for loading
    /// known-good responses at startup before any downstream failures
    /// have occurred.
    pub fn prewarm(&self, service: &str, operation: &str, data: Vec<u8>) {
        self.set(service, operation, data);
    }

    /// Returns a copy of the entry's data if present and not expired.
    ///
    /// On a hit, increments `access_count`, updates `last_access`, and
    /// promotes the key to most-recently-used. On a miss (absent or
    /// expired) returns `None`; an expired entry is removed as a side
    /// effect.
    pub fn get(&self, service: &str, operation: &str) -> Option<Vec<u8>> {
        let key = make_key(service, operation);
        let now = Instant::now();
        let mut state = self.state.lock().unwrap();

        let expired = state
            .entries
            .peek(&key)
            .map(|entry| entry.is_expired(now))
            .unwrap_or(false);

        if expired {
            state.entries.pop(&key);
            state.misses += 1;
            self.emit(CacheEvent::Eviction {
                key: key.clone(),
                reason: EvictionReason::Expired,
                timestamp: now,
            });
            self.emit(CacheEvent::Miss {
                key,
                timestamp: now,
            });
            return None;
        }

        match state.entries.get_mut(&key) {
            Some(entry) => {
                entry.touch(now);
                let data = entry.data().to_vec();
                state.hits += 1;
                self.emit(CacheEvent::Hit {
                    key,
                    timestamp: now,
                });
                Some(data)
            }
            None => {
                state.misses += 1;
                self.emit(CacheEvent::Miss {
                    key,
                    timestamp: now,
                });
                None
            }
        }
    }

    /// Removes `service:operation` if present.
    pub fn delete(&self, service: &str, operation: &str) {
        let key = make_key(service, operation);
        let mut state = self.state.lock().unwrap();
        state.entries.pop(&key);
    }

    /// Removes every entry and resets the LRU order.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.entries.clear();
    }

    /// Returns the number of entries currently stored (including any not
    /// yet swept but already logically expired).
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry whose `expires_at` has passed. Called by the
    /// background expiry sweep; safe to call directly from tests.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap();

        let expired_keys: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            state.entries.pop(key);
        }

        let removed = expired_keys.len();
        drop(state);
        for key in expired_keys {
            self.emit(CacheEvent::Eviction {
                key,
                reason: EvictionReason::Expired,
                timestamp: now,
            });
        }
        removed
    }

    /// A point-in-time snapshot of population and hit-rate.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let state = self.state.lock().unwrap();

        let expired_count = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .count();

        let total_lookups = state.hits + state.misses;
        let hit_rate = if total_lookups == 0 {
            0.0
        } else {
            state.hits as f64 / total_lookups as f64
        };

        let oldest_cached_at = state.entries.iter().map(|(_, e)| e.cached_at()).min();
        let newest_cached_at = state.entries.iter().map(|(_, e)| e.cached_at()).max();

        CacheStats {
            population: state.entries.len(),
            expired_count,
            utilization: state.entries.len() as f64 / self.config.max_size.max(1) as f64,
            hit_rate,
            default_ttl: self.config.default_ttl,
            oldest_cached_at,
            newest_cached_at,
        }
    }

    fn emit(&self, event: CacheEvent) {
        if !self.listeners.is_empty() {
            self.listeners.emit(&event);
        }
        #[cfg(feature = "metrics")]
        record_metric(&event);
    }
}

#[cfg(feature = "metrics")]
fn record_metric(event: &CacheEvent) {
    match event {
        CacheEvent::Hit { .. } => {
            metrics::counter!("sidecar_fallback_cache_hits_total").increment(1);
        }
        CacheEvent::Miss { .. } => {
            metrics::counter!("sidecar_fallback_cache_misses_total").increment(1);
        }
        CacheEvent::Eviction { reason, .. } => {
            let reason_label = match reason {
                EvictionReason::Capacity => "capacity",
                EvictionReason::Expired => "expired",
            };
            metrics::counter!("sidecar_fallback_cache_evictions_total", "reason" => reason_label)
                .increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with_size(max_size: usize) -> FallbackCache {
        FallbackCache::new(CacheConfig {
            max_size,
            default_ttl: Duration::from_secs(3600),
        })
    }

    #[test]
    fn set_then_get_within_ttl_returns_same_payload() {
        let cache = cache_with_size(10);
        cache.set("llm", "compress", b"result".to_vec());
        assert_eq!(cache.get("llm", "compress"), Some(b"result".to_vec()));
    }

    #[test]
    fn get_on_missing_key_returns_none() {
        let cache = cache_with_size(10);
        assert_eq!(cache.get("llm", "compress"), None);
    }

    #[test]
    fn expired_entry_is_absent_and_removed() {
        let cache = FallbackCache::new(CacheConfig {
            max_size: 10,
            default_ttl: Duration::from_millis(10),
        });
        cache.set("llm", "compress", b"result".to_vec());
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.get("llm", "compress"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn population_never_exceeds_max_size() {
        let cache = cache_with_size(3);
        for i in 0..10 {
            cache.set("s", &format!("op{i}"), vec![i as u8]);
            assert!(cache.len() <= 3);
        }
    }

    // Scenario 6 from the testable-properties list: cache maxSize=3,
    // Set(a), Set(b), Set(c), Get(a) (hit), Set(d) evicts "b".
    #[test]
    fn lru_eviction_scenario() {
        let cache = cache_with_size(3);
        cache.set("s", "a", b"a".to_vec());
        cache.set("s", "b", b"b".to_vec());
        cache.set("s", "c", b"c".to_vec());

        assert_eq!(cache.get("s", "a"), Some(b"a".to_vec()));

        cache.set("s", "d", b"d".to_vec());

        assert_eq!(cache.get("s", "a"), Some(b"a".to_vec()));
        assert_eq!(cache.get("s", "b"), None);
        assert_eq!(cache.get("s", "c"), Some(b"c".to_vec()));
        assert_eq!(cache.get("s", "d"), Some(b"d".to_vec()));
    }

    #[test]
    fn set_of_existing_key_still_promotes() {
        let cache = cache_with_size(2);
        cache.set("s", "a", b"1".to_vec());
        cache.set("s", "b", b"2".to_vec());
        // "a" is LRU. Re-Set it, which should promote it to MRU.
        cache.set("s", "a", b"1-updated".to_vec());
        // Now "b" is LRU; inserting "c" should evict "b", not "a".
        cache.set("s", "c", b"3".to_vec());
        assert_eq!(cache.get("s", "a"), Some(b"1-updated".to_vec()));
        assert_eq!(cache.get("s", "b"), None);
    }

    #[test]
    fn repeated_get_is_idempotent_and_monotone_on_access_count() {
        let cache = cache_with_size(10);
        cache.set("s", "a", b"1".to_vec());
        assert_eq!(cache.get("s", "a"), Some(b"1".to_vec()));
        assert_eq!(cache.get("s", "a"), Some(b"1".to_vec()));

        let mut state = cache.state.lock().unwrap();
        assert_eq!(state.entries.get_mut("s:a").unwrap().access_count(), 2);
    }

    #[test]
    fn delete_removes_exact_entry() {
        let cache = cache_with_size(10);
        cache.set("s", "a", b"1".to_vec());
        cache.delete("s", "a");
        assert_eq!(cache.get("s", "a"), None);
    }

    #[test]
    fn clear_resets_map_and_order() {
        let cache = cache_with_size(10);
        cache.set("s", "a", b"1".to_vec());
        cache.set("s", "b", b"2".to_vec());
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get("s", "a"), None);
    }

    #[test]
    fn prewarm_is_equivalent_to_set() {
        let cache = cache_with_size(10);
        cache.prewarm("llm", "compress", b"known-good".to_vec());
        assert_eq!(cache.get("llm", "compress"), Some(b"known-good".to_vec()));
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let cache = FallbackCache::new(CacheConfig {
            max_size: 10,
            default_ttl: Duration::from_millis(10),
        });
        cache.set("s", "short", b"1".to_vec());
        cache.set_with_ttl("s", "long", b"2".to_vec(), Duration::from_secs(3600));

        std::thread::sleep(Duration::from_millis(25));
        let removed = cache.sweep_expired();

        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("s", "long"), Some(b"2".to_vec()));
    }

    #[test]
    fn stats_reports_population_and_ttl_bounds() {
        let cache = cache_with_size(5);
        cache.set("s", "a", b"1".to_vec());
        cache.set("s", "b", b"2".to_vec());
        cache.get("s", "a");
        cache.get("s", "missing");

        let stats = cache.stats();
        assert_eq!(stats.population, 2);
        assert_eq!(stats.expired_count, 0);
        assert!((stats.utilization - 0.4).abs() < f64::EPSILON);
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
        assert!(stats.oldest_cached_at.is_some());
        assert!(stats.newest_cached_at.is_some());
    }

    #[test]
    fn pop_lru_on_an_empty_state_is_a_no_op() {
        let mut state = CacheState::new(10);
        assert!(state.entries.pop_lru().is_none());
    }
}
