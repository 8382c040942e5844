//! Observability events emitted by the rate limiter.

use std::time::Instant;

use sidecar_core::SidecarEvent;

use crate::result::DenialReason;

/// Emitted once per [`RateLimiter::check_limit`](crate::RateLimiter::check_limit) call.
#[derive(Debug, Clone)]
pub enum RateLimiterEvent {
    Allowed {
        client_id: String,
        endpoint: String,
        timestamp: Instant,
    },
    Denied {
        client_id: String,
        endpoint: String,
        reason: DenialReason,
        timestamp: Instant,
    },
    ClientEvicted {
        client_id: String,
        timestamp: Instant,
    },
}

impl SidecarEvent for RateLimiterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RateLimiterEvent::Allowed { .. } => "ratelimiter_allowed",
            RateLimiterEvent::Denied { .. } => "ratelimiter_denied",
            RateLimiterEvent::ClientEvicted { .. } => "ratelimiter_client_evicted",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RateLimiterEvent::Allowed { timestamp, .. }
            | RateLimiterEvent::Denied { timestamp, .. }
            | RateLimiterEvent::ClientEvicted { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        "rate_limiter"
    }
}
