//! Hierarchical rate limiter for the session-sidecar resilience core.
//!
//! Three gates are evaluated per request — a no-op global gate, a
//! per-client token bucket, and an optional per-endpoint token bucket —
//! alongside an independent sliding-window burst detector. Only the
//! admission layer calls into this crate; it owns client identification
//! and endpoint-key normalization, and consults [`RateLimiter`] with the
//! already-normalized tuple.
//!
//! # Example
//!
//! ```
//! use sidecar_ratelimiter::{RateLimiter, RateLimiterConfig};
//!
//! let limiter = RateLimiter::new(RateLimiterConfig::default());
//! let result = limiter.check_limit("client-1", "GET:/api/v1/sessions", "GET", None, None);
//! assert!(result.allowed);
//! ```

mod bucket;
mod burst;
mod client;
mod config;
mod events;
mod limiter;
mod result;
mod sweeper;

pub use bucket::TokenBucket;
pub use burst::BurstInfo;
pub use client::{ClientLimiter, EndpointTracker};
pub use config::{EndpointLimit, RateLimiterConfig};
pub use events::RateLimiterEvent;
pub use limiter::RateLimiter;
pub use result::{DenialReason, RateLimitResult};
pub use sweeper::spawn_sweeper;
