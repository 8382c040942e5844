//! Background expiry sweep, run every 5 minutes per the cache's design.

use crate::store::FallbackCache;
use sidecar_core::ShutdownSignal;
use std::sync::Arc;
use std::time::Duration;

/// Default interval between expiry sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Spawns the background task that removes expired entries on a fixed
/// interval, until `shutdown` fires. Errors are impossible here (the
/// sweep is infallible), so nothing propagates into the request path.
pub fn spawn_sweeper(
    cache: Arc<FallbackCache>,
    interval: Duration,
    mut shutdown: ShutdownSignal,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = cache.sweep_expired();
                    #[cfg(feature = "tracing")]
                    if removed > 0 {
                        tracing::debug!(removed, "fallback cache expiry sweep");
                    }
                    #[cfg(not(feature = "tracing"))]
                    let _ = removed;
                }
                _ = shutdown.cancelled() => break,
            }
        }
    })
}
