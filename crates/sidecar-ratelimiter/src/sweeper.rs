//! Background sweep that forgets clients idle past their TTL.

use std::sync::Arc;
use std::time::Duration;

use sidecar_core::ShutdownSignal;

use crate::limiter::RateLimiter;

/// Spawns the idle-client sweep on `interval`, until `shutdown` fires.
pub fn spawn_sweeper(
    limiter: Arc<RateLimiter>,
    interval: Duration,
    mut shutdown: ShutdownSignal,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = limiter.sweep_idle_clients();
                    #[cfg(feature = "tracing")]
                    if removed > 0 {
                        tracing::debug!(removed, "rate limiter idle client sweep");
                    }
                    #[cfg(not(feature = "tracing"))]
                    let _ = removed;
                }
                _ = shutdown.cancelled() => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimiterConfig;
    use sidecar_core::shutdown_channel;

    #[tokio::test]
    async fn sweeper_evicts_idle_clients_on_schedule() {
        let limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
            client_ttl: Duration::from_millis(5),
            ..RateLimiterConfig::default()
        }));
        limiter.check_limit("idle-client", "GET:/x", "GET", None, None);
        assert_eq!(limiter.client_count(), 1);

        let (handle, signal) = shutdown_channel();
        let task = spawn_sweeper(Arc::clone(&limiter), Duration::from_millis(20), signal);

        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.shutdown();
        let _ = task.await;

        assert_eq!(limiter.client_count(), 0);
    }
}
