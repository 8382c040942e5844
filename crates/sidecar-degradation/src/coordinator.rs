//! Wraps downstream calls with cache-backed fallback on failure.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use sidecar_cache::FallbackCache;
use sidecar_core::EventListeners;

use crate::error::{DegradationError, DownstreamFailure};
use crate::events::DegradationEvent;

/// The result of a coordinated call: either fresh from downstream, or
/// served from the fallback cache and marked as degraded.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Fresh(T),
    Degraded(Vec<u8>),
}

impl<T> Outcome<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded(_))
    }
}

/// Counts of fallback outcomes, read by the governor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DegradationStats {
    pub fallback_served: u64,
    pub fallback_missed: u64,
}

/// Mediates downstream failures behind a shared [`FallbackCache`]. Does
/// not retry — retries are the caller's decision.
pub struct DegradationCoordinator {
    cache: std::sync::Arc<FallbackCache>,
    fallback_served: AtomicU64,
    fallback_missed: AtomicU64,
    listeners: EventListeners<DegradationEvent>,
}

impl DegradationCoordinator {
    pub fn new(cache: std::sync::Arc<FallbackCache>) -> Self {
        Self {
            cache,
            fallback_served: AtomicU64::new(0),
            fallback_missed: AtomicU64::new(0),
            listeners: EventListeners::new(),
        }
    }

    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: sidecar_core::EventListener<DegradationEvent> + 'static,
    {
        self.listeners.add(listener);
    }

    pub fn stats(&self) -> DegradationStats {
        DegradationStats {
            fallback_served: self.fallback_served.load(Ordering::Relaxed),
            fallback_missed: self.fallback_missed.load(Ordering::Relaxed),
        }
    }

    /// Populates a cache entry with a known-good response before any
    /// failures occur.
    pub fn prewarm(&self, service: &str, operation: &str, known_good: Vec<u8>) {
        self.cache.prewarm(service, operation, known_good);
    }

    /// Runs `call`, caching its result on success. On a fallback-eligible
    /// failure, serves the cached response if one exists, or surfaces
    /// `FallbackMiss`. Non-fallback-eligible failures pass through
    /// unchanged and are never cached.
    pub async fn execute<F, Fut, T, E>(
        &self,
        service: &str,
        operation: &str,
        call: F,
    ) -> Result<Outcome<T>, DegradationError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Clone + Into<Vec<u8>>,
        E: DownstreamFailure,
    {
        match call().await {
            Ok(value) => {
                self.cache.set(service, operation, value.clone().into());
                self.emit(DegradationEvent::Succeeded {
                    service: service.to_string(),
                    operation: operation.to_string(),
                    timestamp: Instant::now(),
                });
                Ok(Outcome::Fresh(value))
            }
            Err(err) => {
                if !err.should_fallback() {
                    self.emit(DegradationEvent::PassedThrough {
                        service: service.to_string(),
                        operation: operation.to_string(),
                        timestamp: Instant::now(),
                    });
                    return Err(DegradationError::PassThrough(err));
                }

                match self.cache.get(service, operation) {
                    Some(cached) => {
                        self.fallback_served.fetch_add(1, Ordering::Relaxed);
                        self.emit(DegradationEvent::FallbackServed {
                            service: service.to_string(),
                            operation: operation.to_string(),
                            timestamp: Instant::now(),
                        });
                        #[cfg(feature = "metrics")]
                        metrics::counter!("sidecar_degradation_fallback_served_total").increment(1);
                        Ok(Outcome::Degraded(cached))
                    }
                    None => {
                        self.fallback_missed.fetch_add(1, Ordering::Relaxed);
                        self.emit(DegradationEvent::FallbackMissed {
                            service: service.to_string(),
                            operation: operation.to_string(),
                            timestamp: Instant::now(),
                        });
                        #[cfg(feature = "metrics")]
                        metrics::counter!("sidecar_degradation_fallback_missed_total").increment(1);
                        Err(DegradationError::FallbackMiss)
                    }
                }
            }
        }
    }

    fn emit(&self, event: DegradationEvent) {
        if !self.listeners.is_empty() {
            self.listeners.emit(&event);
        }
    }
}
