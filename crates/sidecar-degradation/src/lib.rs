//! Degradation coordinator for the session-sidecar resilience core.
//!
//! Wraps a downstream call, caching its success via a shared
//! [`FallbackCache`](sidecar_cache::FallbackCache) and serving the cached
//! response (marked degraded) when the call fails in a fallback-eligible
//! way. Never retries — that decision belongs to the caller.
//!
//! # Example
//!
//! ```
//! use sidecar_cache::{CacheConfig, FallbackCache};
//! use sidecar_degradation::{DegradationCoordinator, DownstreamFailure, Outcome};
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Timeout;
//! impl DownstreamFailure for Timeout {
//!     fn should_fallback(&self) -> bool { true }
//! }
//!
//! # async fn run() {
//! let coordinator = DegradationCoordinator::new(Arc::new(FallbackCache::with_defaults()));
//! let result = coordinator
//!     .execute("llm", "compress", || async { Ok::<_, Timeout>(b"summary".to_vec()) })
//!     .await
//!     .unwrap();
//! assert!(matches!(result, Outcome::Fresh(_)));
//! # }
//! ```

mod coordinator;
mod error;
mod events;

pub use coordinator::{DegradationCoordinator, DegradationStats, Outcome};
pub use error::{DegradationError, DownstreamFailure};
pub use events::DegradationEvent;
