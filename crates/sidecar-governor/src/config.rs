//! Tunables for the performance governor.

use std::time::Duration;

/// Configuration for [`PerformanceGovernor`](crate::PerformanceGovernor).
#[derive(Debug, Clone)]
pub struct GovernorConfig {
    /// Cadence of the metrics-collection timer.
    pub metrics_interval: Duration,
    /// Cadence of the optimization pass (memory + rate-limit adaptation).
    pub optimization_interval: Duration,
    /// Cadence of the independent memory watchdog.
    pub memory_watchdog_interval: Duration,
    /// Target ceiling used to compute `memory_pressure = usage / limit`.
    pub memory_limit_mb: f64,
    /// The GC target percent restored once memory pressure subsides.
    pub gc_target_percent: u8,
    /// Floor for adaptive rate-limit decreases.
    pub base_limit: u32,
    /// Ceiling for adaptive rate-limit increases.
    pub burst_limit: u32,
    /// Whether the rate-limit adaptation branch runs at all.
    pub adaptive_enabled: bool,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            metrics_interval: Duration::from_secs(10),
            optimization_interval: Duration::from_secs(60),
            memory_watchdog_interval: Duration::from_secs(30),
            memory_limit_mb: 512.0,
            gc_target_percent: 100,
            base_limit: 30,
            burst_limit: 300,
            adaptive_enabled: true,
        }
    }
}
