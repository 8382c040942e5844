//! Adaptive performance governor for the session-sidecar resilience core.
//!
//! Runs on three independent timers: a metrics sampler, an optimization
//! pass that adjusts the GC target and the rate limiter's adaptive
//! `currentLimit`, and a memory watchdog that reacts to critical
//! pressure on its own schedule. It holds the rate limiter only through
//! the narrow slice of its API this crate actually calls — reading
//! `current_limit` and writing it back — never its gate-evaluation path.
//!
//! # Example
//!
//! ```
//! use sidecar_governor::{GovernorConfig, PerformanceGovernor};
//! use sidecar_governor::reclaim::NoopReclaimer;
//! use sidecar_governor::metrics::{RuntimeSampler, RuntimeStats};
//! use sidecar_ratelimiter::{RateLimiter, RateLimiterConfig};
//! use std::sync::Arc;
//!
//! struct FixedSampler;
//! impl RuntimeSampler for FixedSampler {
//!     fn sample(&self) -> RuntimeStats {
//!         RuntimeStats { memory_usage_mb: 100.0, ..RuntimeStats::default() }
//!     }
//! }
//!
//! let limiter = Arc::new(RateLimiter::new(RateLimiterConfig::default()));
//! let governor = PerformanceGovernor::new(
//!     GovernorConfig::default(),
//!     limiter,
//!     Arc::new(FixedSampler),
//!     Arc::new(NoopReclaimer),
//! );
//! governor.collect_metrics();
//! let _preset = governor.current_preset();
//! ```

mod config;
mod events;
mod governor;
pub mod metrics;
pub mod reclaim;
mod schedule;

pub use config::GovernorConfig;
pub use events::{AdaptDirection, GovernorEvent};
pub use governor::PerformanceGovernor;
pub use metrics::{PerformanceMetrics, RuntimeSampler, RuntimeStats};
pub use reclaim::{MemoryReclaimer, NoopReclaimer};
pub use schedule::spawn_timers;
