//! Observability events emitted by the performance governor.

use std::time::Instant;

use sidecar_core::SidecarEvent;

/// Which way the rate-limit adaptation branch moved `currentLimit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptDirection {
    Increase,
    Decrease,
}

#[derive(Debug, Clone)]
pub enum GovernorEvent {
    MetricsCollected {
        memory_pressure: f64,
        queued_requests: u32,
        timestamp: Instant,
    },
    MemoryReclamationForced {
        memory_pressure: f64,
        timestamp: Instant,
    },
    GcTargetAdjusted {
        percent: u8,
        timestamp: Instant,
    },
    RateLimitAdapted {
        direction: AdaptDirection,
        new_limit: u32,
        timestamp: Instant,
    },
    MemoryWatchdogWarning {
        usage_ratio: f64,
        timestamp: Instant,
    },
}

impl SidecarEvent for GovernorEvent {
    fn event_type(&self) -> &'static str {
        match self {
            GovernorEvent::MetricsCollected { .. } => "governor_metrics_collected",
            GovernorEvent::MemoryReclamationForced { .. } => "governor_memory_reclamation_forced",
            GovernorEvent::GcTargetAdjusted { .. } => "governor_gc_target_adjusted",
            GovernorEvent::RateLimitAdapted { .. } => "governor_rate_limit_adapted",
            GovernorEvent::MemoryWatchdogWarning { .. } => "governor_memory_watchdog_warning",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            GovernorEvent::MetricsCollected { timestamp, .. }
            | GovernorEvent::MemoryReclamationForced { timestamp, .. }
            | GovernorEvent::GcTargetAdjusted { timestamp, .. }
            | GovernorEvent::RateLimitAdapted { timestamp, .. }
            | GovernorEvent::MemoryWatchdogWarning { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        "performance_governor"
    }
}
