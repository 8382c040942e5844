//! Observability events emitted by the degradation coordinator.

use std::time::Instant;

use sidecar_core::SidecarEvent;

#[derive(Debug, Clone)]
pub enum DegradationEvent {
    /// The downstream call succeeded; its result was cached.
    Succeeded {
        service: String,
        operation: String,
        timestamp: Instant,
    },
    /// The downstream call failed in a fallback-eligible way and a
    /// cached response was served, annotated as degraded.
    FallbackServed {
        service: String,
        operation: String,
        timestamp: Instant,
    },
    /// The downstream call failed in a fallback-eligible way and
    /// nothing was cached.
    FallbackMissed {
        service: String,
        operation: String,
        timestamp: Instant,
    },
    /// The downstream call failed with a non-fallback-eligible error
    /// (input validation, auth); passed through uncached.
    PassedThrough {
        service: String,
        operation: String,
        timestamp: Instant,
    },
}

impl SidecarEvent for DegradationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DegradationEvent::Succeeded { .. } => "degradation_succeeded",
            DegradationEvent::FallbackServed { .. } => "degradation_fallback_served",
            DegradationEvent::FallbackMissed { .. } => "degradation_fallback_missed",
            DegradationEvent::PassedThrough { .. } => "degradation_passed_through",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            DegradationEvent::Succeeded { timestamp, .. }
            | DegradationEvent::FallbackServed { timestamp, .. }
            | DegradationEvent::FallbackMissed { timestamp, .. }
            | DegradationEvent::PassedThrough { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        "degradation_coordinator"
    }
}
