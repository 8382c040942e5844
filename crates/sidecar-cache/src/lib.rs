//! Bounded LRU fallback cache with TTL for the session-sidecar resilience
//! core.
//!
//! This is the leaf component of the resilience core: a `service:operation`
//! keyed store the degradation coordinator reads from and writes to when
//! the downstream LLM/store calls fail or succeed. It owns its entries
//! exclusively — no other component mutates them.
//!
//! # Example
//!
//! ```
//! use sidecar_cache::{CacheConfig, FallbackCache};
//! use std::time::Duration;
//!
//! let cache = FallbackCache::new(CacheConfig {
//!     max_size: 100,
//!     default_ttl: Duration::from_secs(300),
//! });
//!
//! cache.set("llm", "compress", b"summary".to_vec());
//! assert_eq!(cache.get("llm", "compress"), Some(b"summary".to_vec()));
//! ```

mod entry;
mod events;
mod store;
mod sweeper;

pub use entry::{CacheEntry, CacheStats};
pub use events::{CacheEvent, EvictionReason};
pub use store::{CacheConfig, FallbackCache};
pub use sweeper::{spawn_sweeper, DEFAULT_SWEEP_INTERVAL};
