//! The performance governor: two independent timers (metrics collection,
//! optimization) plus a third, independent memory watchdog.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

use sidecar_core::{EventListeners, ModelPreset};
use sidecar_ratelimiter::RateLimiter;

use crate::config::GovernorConfig;
use crate::events::{AdaptDirection, GovernorEvent};
use crate::metrics::{PerformanceMetrics, RuntimeSampler};
use crate::reclaim::MemoryReclaimer;

/// Observes runtime metrics on a timer and adjusts GC target and the
/// rate limiter's adaptive `currentLimit` knob on another. A third,
/// fully independent timer watches for critical memory pressure.
pub struct PerformanceGovernor {
    config: GovernorConfig,
    metrics: RwLock<PerformanceMetrics>,
    gc_target_percent: AtomicU8,
    limiter: Arc<RateLimiter>,
    sampler: Arc<dyn RuntimeSampler>,
    reclaimer: Arc<dyn MemoryReclaimer>,
    listeners: EventListeners<GovernorEvent>,
}

impl PerformanceGovernor {
    pub fn new(
        config: GovernorConfig,
        limiter: Arc<RateLimiter>,
        sampler: Arc<dyn RuntimeSampler>,
        reclaimer: Arc<dyn MemoryReclaimer>,
    ) -> Self {
        let gc_target_percent = config.gc_target_percent;
        Self {
            config,
            metrics: RwLock::new(PerformanceMetrics::default()),
            gc_target_percent: AtomicU8::new(gc_target_percent),
            limiter,
            sampler,
            reclaimer,
            listeners: EventListeners::new(),
        }
    }

    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: sidecar_core::EventListener<GovernorEvent> + 'static,
    {
        self.listeners.add(listener);
    }

    pub fn metrics_snapshot(&self) -> PerformanceMetrics {
        *self.metrics.read().expect("governor metrics lock poisoned")
    }

    pub fn gc_target_percent(&self) -> u8 {
        self.gc_target_percent.load(Ordering::Relaxed)
    }

    pub fn config_metrics_interval(&self) -> std::time::Duration {
        self.config.metrics_interval
    }

    pub fn config_optimization_interval(&self) -> std::time::Duration {
        self.config.optimization_interval
    }

    pub fn config_memory_watchdog_interval(&self) -> std::time::Duration {
        self.config.memory_watchdog_interval
    }

    /// Samples the runtime and stores the derived snapshot. Called on
    /// `metrics_interval`.
    pub fn collect_metrics(&self) {
        let sample = self.sampler.sample();
        let derived = PerformanceMetrics::from_sample(sample, self.config.memory_limit_mb);
        *self.metrics.write().expect("governor metrics lock poisoned") = derived;
        self.emit(GovernorEvent::MetricsCollected {
            memory_pressure: derived.memory_pressure,
            queued_requests: derived.queued_requests,
            timestamp: std::time::Instant::now(),
        });
    }

    /// Runs the memory branch and the rate-limit adaptation branch.
    /// Called on `optimization_interval`. The two branches of each are
    /// mutually exclusive with themselves (not with each other): at
    /// most one memory action and at most one rate-limit action per
    /// call.
    pub fn run_optimization_pass(&self) {
        let snapshot = self.metrics_snapshot();
        self.run_memory_branch(snapshot.memory_pressure);
        if self.config.adaptive_enabled {
            self.run_rate_limit_branch(snapshot.queued_requests);
        }
    }

    fn run_memory_branch(&self, memory_pressure: f64) {
        let now = std::time::Instant::now();
        if memory_pressure > 0.8 {
            self.reclaimer.force_reclaim();
            self.gc_target_percent.store(50, Ordering::Relaxed);
            self.emit(GovernorEvent::MemoryReclamationForced {
                memory_pressure,
                timestamp: now,
            });
            self.emit(GovernorEvent::GcTargetAdjusted {
                percent: 50,
                timestamp: now,
            });
        } else if memory_pressure < 0.4 {
            let restored = self.config.gc_target_percent;
            if self.gc_target_percent.swap(restored, Ordering::Relaxed) != restored {
                self.emit(GovernorEvent::GcTargetAdjusted {
                    percent: restored,
                    timestamp: now,
                });
            }
        }
    }

    fn run_rate_limit_branch(&self, queued_requests: u32) {
        let current = self.limiter.current_limit();
        let now = std::time::Instant::now();

        if queued_requests as u64 > current as u64 {
            let increased = ((current as f64) * 1.1).floor() as u32;
            let new_limit = increased.min(self.config.burst_limit);
            if new_limit != current {
                self.limiter.set_current_limit(new_limit);
                self.emit(GovernorEvent::RateLimitAdapted {
                    direction: AdaptDirection::Increase,
                    new_limit,
                    timestamp: now,
                });
            }
        } else if (queued_requests as f64) < (current as f64) / 2.0 {
            let decreased = ((current as f64) * 0.9).floor() as u32;
            let new_limit = decreased.max(self.config.base_limit);
            if new_limit != current {
                self.limiter.set_current_limit(new_limit);
                self.emit(GovernorEvent::RateLimitAdapted {
                    direction: AdaptDirection::Decrease,
                    new_limit,
                    timestamp: now,
                });
            }
        }
    }

    /// Runs on its own 30 s timer, independent of the optimization pass.
    pub fn run_memory_watchdog_pass(&self) {
        let snapshot = self.metrics_snapshot();
        let ratio = if self.config.memory_limit_mb > 0.0 {
            snapshot.memory_usage_mb / self.config.memory_limit_mb
        } else {
            0.0
        };

        if ratio > 0.9 {
            self.reclaimer.force_reclaim();
            self.reclaimer.release_unused_os_memory();
            #[cfg(feature = "tracing")]
            tracing::warn!(usage_ratio = ratio, "memory watchdog: critical pressure");
            self.emit(GovernorEvent::MemoryWatchdogWarning {
                usage_ratio: ratio,
                timestamp: std::time::Instant::now(),
            });
        } else if ratio > 0.8 {
            #[cfg(feature = "tracing")]
            tracing::info!(usage_ratio = ratio, "memory watchdog: elevated pressure");
        }
    }

    /// The model preset the degradation coordinator / LLM collaborator
    /// should use right now, recomputed from the latest snapshot and
    /// the rate limiter's adaptive knob. This reads state; it is not a
    /// third adaptation branch.
    pub fn current_preset(&self) -> ModelPreset {
        let snapshot = self.metrics_snapshot();
        let current_limit = self.limiter.current_limit();

        if snapshot.memory_pressure > 0.8 || current_limit <= self.config.base_limit {
            ModelPreset::Fast
        } else if snapshot.memory_pressure < 0.4 && current_limit >= self.config.burst_limit {
            ModelPreset::Quality
        } else {
            ModelPreset::Balanced
        }
    }

    fn emit(&self, event: GovernorEvent) {
        if !self.listeners.is_empty() {
            self.listeners.emit(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::RuntimeStats;
    use sidecar_ratelimiter::RateLimiterConfig;
    use std::sync::Mutex;

    struct StubSampler(Mutex<RuntimeStats>);

    impl RuntimeSampler for StubSampler {
        fn sample(&self) -> RuntimeStats {
            *self.0.lock().unwrap()
        }
    }

    struct CountingReclaimer(std::sync::atomic::AtomicUsize);

    impl MemoryReclaimer for CountingReclaimer {
        fn force_reclaim(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn governor_with(stats: RuntimeStats, config: GovernorConfig) -> (Arc<PerformanceGovernor>, Arc<RateLimiter>) {
        let limiter = Arc::new(RateLimiter::new(RateLimiterConfig::default()));
        let sampler = Arc::new(StubSampler(Mutex::new(stats)));
        let reclaimer = Arc::new(crate::reclaim::NoopReclaimer);
        let governor = Arc::new(PerformanceGovernor::new(config, Arc::clone(&limiter), sampler, reclaimer));
        (governor, limiter)
    }

    #[test]
    fn collect_metrics_derives_pressure_from_sample() {
        let (governor, _limiter) = governor_with(
            RuntimeStats {
                memory_usage_mb: 400.0,
                ..RuntimeStats::default()
            },
            GovernorConfig {
                memory_limit_mb: 500.0,
                ..GovernorConfig::default()
            },
        );
        governor.collect_metrics();
        assert_eq!(governor.metrics_snapshot().memory_pressure, 0.8);
    }

    #[test]
    fn high_pressure_tightens_gc_target() {
        let (governor, _limiter) = governor_with(
            RuntimeStats {
                memory_usage_mb: 450.0,
                ..RuntimeStats::default()
            },
            GovernorConfig {
                memory_limit_mb: 500.0,
                ..GovernorConfig::default()
            },
        );
        governor.collect_metrics();
        governor.run_optimization_pass();
        assert_eq!(governor.gc_target_percent(), 50);
    }

    #[test]
    fn low_pressure_restores_configured_gc_target() {
        let (governor, _limiter) = governor_with(
            RuntimeStats {
                memory_usage_mb: 50.0,
                ..RuntimeStats::default()
            },
            GovernorConfig {
                memory_limit_mb: 500.0,
                gc_target_percent: 100,
                ..GovernorConfig::default()
            },
        );
        governor.collect_metrics();
        governor.run_optimization_pass();
        assert_eq!(governor.gc_target_percent(), 100);
    }

    #[test]
    fn rate_limit_increases_when_queue_exceeds_current_limit() {
        let config = GovernorConfig {
            base_limit: 30,
            burst_limit: 300,
            ..GovernorConfig::default()
        };
        let (governor, limiter) = governor_with(
            RuntimeStats {
                queued_requests: 1000,
                ..RuntimeStats::default()
            },
            config,
        );
        let before = limiter.current_limit();
        governor.collect_metrics();
        governor.run_optimization_pass();
        assert!(limiter.current_limit() > before);
    }

    #[test]
    fn rate_limit_decreases_when_queue_well_below_current_limit() {
        let config = GovernorConfig {
            base_limit: 30,
            burst_limit: 300,
            ..GovernorConfig::default()
        };
        let (governor, limiter) = governor_with(
            RuntimeStats {
                queued_requests: 0,
                ..RuntimeStats::default()
            },
            config,
        );
        let before = limiter.current_limit();
        governor.collect_metrics();
        governor.run_optimization_pass();
        assert!(limiter.current_limit() < before);
        assert!(limiter.current_limit() >= 30);
    }

    #[test]
    fn rate_limit_increase_never_exceeds_burst_limit() {
        let config = GovernorConfig {
            base_limit: 30,
            burst_limit: 65,
            adaptive_enabled: true,
            ..GovernorConfig::default()
        };
        let (governor, limiter) = governor_with(
            RuntimeStats {
                queued_requests: 10_000,
                ..RuntimeStats::default()
            },
            config,
        );
        for _ in 0..50 {
            governor.collect_metrics();
            governor.run_optimization_pass();
        }
        assert!(limiter.current_limit() <= 65);
    }

    #[test]
    fn disabled_adaptation_never_changes_current_limit() {
        let config = GovernorConfig {
            adaptive_enabled: false,
            ..GovernorConfig::default()
        };
        let (governor, limiter) = governor_with(
            RuntimeStats {
                queued_requests: 10_000,
                ..RuntimeStats::default()
            },
            config,
        );
        let before = limiter.current_limit();
        governor.collect_metrics();
        governor.run_optimization_pass();
        assert_eq!(limiter.current_limit(), before);
    }

    #[test]
    fn watchdog_forces_reclaim_above_critical_threshold() {
        let reclaim_count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let limiter = Arc::new(RateLimiter::new(RateLimiterConfig::default()));
        let sampler = Arc::new(StubSampler(Mutex::new(RuntimeStats {
            memory_usage_mb: 480.0,
            ..RuntimeStats::default()
        })));
        let reclaimer = Arc::new(CountingReclaimer(std::sync::atomic::AtomicUsize::new(0)));
        let governor = PerformanceGovernor::new(
            GovernorConfig {
                memory_limit_mb: 500.0,
                ..GovernorConfig::default()
            },
            limiter,
            sampler,
            Arc::clone(&reclaimer) as Arc<dyn MemoryReclaimer>,
        );
        governor.collect_metrics();
        governor.run_memory_watchdog_pass();
        assert_eq!(reclaimer.0.load(Ordering::Relaxed), 1);
        let _ = &reclaim_count;
    }

    #[test]
    fn preset_is_fast_under_high_memory_pressure() {
        let (governor, _limiter) = governor_with(
            RuntimeStats {
                memory_usage_mb: 460.0,
                ..RuntimeStats::default()
            },
            GovernorConfig {
                memory_limit_mb: 500.0,
                ..GovernorConfig::default()
            },
        );
        governor.collect_metrics();
        assert_eq!(governor.current_preset(), ModelPreset::Fast);
    }

    #[test]
    fn preset_is_fast_when_current_limit_at_base() {
        let (governor, limiter) = governor_with(RuntimeStats::default(), GovernorConfig::default());
        limiter.set_current_limit(30);
        governor.collect_metrics();
        assert_eq!(governor.current_preset(), ModelPreset::Fast);
    }

    #[test]
    fn preset_is_quality_under_low_pressure_and_high_limit() {
        let (governor, limiter) = governor_with(
            RuntimeStats {
                memory_usage_mb: 50.0,
                ..RuntimeStats::default()
            },
            GovernorConfig {
                memory_limit_mb: 500.0,
                burst_limit: 300,
                ..GovernorConfig::default()
            },
        );
        limiter.set_current_limit(300);
        governor.collect_metrics();
        assert_eq!(governor.current_preset(), ModelPreset::Quality);
    }

    // Literal scenario: baseLimit=100, burstLimit=200. Queue at 150
    // (above current=100) bumps the limit to 110; queue then drops to
    // 40 (below half of 110), dropping the limit to 99, clamped up to
    // the 100 base floor.
    #[test]
    fn rate_limit_adaptation_matches_the_worked_clamping_scenario() {
        let config = GovernorConfig {
            base_limit: 100,
            burst_limit: 200,
            ..GovernorConfig::default()
        };
        let (governor, limiter) = governor_with(RuntimeStats { queued_requests: 150, ..RuntimeStats::default() }, config);
        limiter.set_current_limit(100);

        governor.collect_metrics();
        governor.run_optimization_pass();
        assert_eq!(limiter.current_limit(), 110);

        *governor.metrics.write().unwrap() =
            crate::metrics::PerformanceMetrics { queued_requests: 40, ..governor.metrics_snapshot() };
        governor.run_optimization_pass();
        assert_eq!(limiter.current_limit(), 100);
    }

    #[test]
    fn preset_is_balanced_otherwise() {
        let (governor, limiter) = governor_with(
            RuntimeStats {
                memory_usage_mb: 250.0,
                ..RuntimeStats::default()
            },
            GovernorConfig {
                memory_limit_mb: 500.0,
                base_limit: 30,
                burst_limit: 300,
                ..GovernorConfig::default()
            },
        );
        limiter.set_current_limit(150);
        governor.collect_metrics();
        assert_eq!(governor.current_preset(), ModelPreset::Balanced);
    }
}
