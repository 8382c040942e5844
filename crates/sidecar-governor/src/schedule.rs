//! Spawns the governor's three independent background timers.

use std::sync::Arc;

use sidecar_core::ShutdownSignal;

use crate::governor::PerformanceGovernor;

/// Spawns the metrics-collection, optimization, and memory-watchdog
/// loops as separate tasks, each on its own cadence, each exiting when
/// `shutdown` fires. They share `governor` but never share a lock
/// across tasks beyond what `PerformanceGovernor`'s own internal
/// `RwLock` already serializes.
pub fn spawn_timers(
    governor: Arc<PerformanceGovernor>,
    shutdown: ShutdownSignal,
) -> Vec<tokio::task::JoinHandle<()>> {
    vec![
        spawn_metrics_loop(Arc::clone(&governor), shutdown.clone()),
        spawn_optimization_loop(Arc::clone(&governor), shutdown.clone()),
        spawn_watchdog_loop(governor, shutdown),
    ]
}

fn spawn_metrics_loop(
    governor: Arc<PerformanceGovernor>,
    mut shutdown: ShutdownSignal,
) -> tokio::task::JoinHandle<()> {
    let interval = governor.config_metrics_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => governor.collect_metrics(),
                _ = shutdown.cancelled() => break,
            }
        }
    })
}

fn spawn_optimization_loop(
    governor: Arc<PerformanceGovernor>,
    mut shutdown: ShutdownSignal,
) -> tokio::task::JoinHandle<()> {
    let interval = governor.config_optimization_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => governor.run_optimization_pass(),
                _ = shutdown.cancelled() => break,
            }
        }
    })
}

fn spawn_watchdog_loop(
    governor: Arc<PerformanceGovernor>,
    mut shutdown: ShutdownSignal,
) -> tokio::task::JoinHandle<()> {
    let interval = governor.config_memory_watchdog_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => governor.run_memory_watchdog_pass(),
                _ = shutdown.cancelled() => break,
            }
        }
    })
}
