//! Events emitted by the fallback cache.

use sidecar_core::SidecarEvent;
use std::time::Instant;

/// Observability events emitted by [`crate::FallbackCache`].
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A `Get` found a live, non-expired entry.
    Hit {
        key: String,
        timestamp: Instant,
    },
    /// A `Get` found nothing, or found an expired entry.
    Miss {
        key: String,
        timestamp: Instant,
    },
    /// An entry was evicted to make room for a new one (LRU eviction) or
    /// removed by the expiry sweep.
    Eviction {
        key: String,
        reason: EvictionReason,
        timestamp: Instant,
    },
}

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// Removed to keep `len(cache) <= max_size` on a `Set` of a new key.
    Capacity,
    /// Removed by the periodic expiry sweep or an opportunistic check on `Get`.
    Expired,
}

impl SidecarEvent for CacheEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CacheEvent::Hit { .. } => "cache_hit",
            CacheEvent::Miss { .. } => "cache_miss",
            CacheEvent::Eviction { .. } => "cache_eviction",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CacheEvent::Hit { timestamp, .. }
            | CacheEvent::Miss { timestamp, .. }
            | CacheEvent::Eviction { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        "fallback_cache"
    }
}
