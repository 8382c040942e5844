//! The three-gate rate limiter: global (no-op) → client → endpoint, plus
//! an independent burst detector.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use sidecar_core::EventListeners;

use crate::client::ClientLimiter;
use crate::config::RateLimiterConfig;
use crate::events::RateLimiterEvent;
use crate::result::{DenialReason, RateLimitResult};

struct RateLimiterState {
    clients: HashMap<String, ClientLimiter>,
}

/// Hierarchical token-bucket rate limiter with per-client TTL eviction
/// and burst detection.
///
/// A single mutex protects the client map and every piece of embedded
/// per-client state (its bucket, its endpoint trackers, its burst
/// window), matching the "single writer lock" ownership rule: only the
/// rate limiter mutates `ClientLimiter`; other components may only read
/// through its public API.
pub struct RateLimiter {
    config: RateLimiterConfig,
    state: Mutex<RateLimiterState>,
    listeners: EventListeners<RateLimiterEvent>,
    /// The governor's adaptive knob. Newly admitted clients (those with
    /// no `custom_rate`) are seeded from this value rather than from
    /// `config.default_rate_limit` directly, so the governor can widen
    /// or narrow admission for clients created after it last adapted.
    current_limit: AtomicU32,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        let current_limit = config.default_rate_limit;
        Self {
            config,
            state: Mutex::new(RateLimiterState {
                clients: HashMap::new(),
            }),
            listeners: EventListeners::new(),
            current_limit: AtomicU32::new(current_limit),
        }
    }

    /// The governor's current adaptive rate-limit knob, in requests per
    /// minute. Read by the governor's optimization pass and applied to
    /// newly admitted clients.
    pub fn current_limit(&self) -> u32 {
        self.current_limit.load(Ordering::Relaxed)
    }

    /// Sets the governor's adaptive rate-limit knob. Does not affect
    /// clients already admitted; call `update_client_limit` for that.
    pub fn set_current_limit(&self, limit: u32) {
        self.current_limit.store(limit, Ordering::Relaxed);
    }

    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: sidecar_core::EventListener<RateLimiterEvent> + 'static,
    {
        self.listeners.add(listener);
    }

    /// Evaluates the global, client, and endpoint gates (in that order)
    /// plus the burst detector, for a single request.
    ///
    /// Token consumption is all-or-nothing: the client and endpoint
    /// buckets are only decremented once every gate has agreed to
    /// allow the request. A denial anywhere leaves every bucket
    /// untouched and only increments the client's `blocked_requests`.
    pub fn check_limit(
        &self,
        client_id: &str,
        endpoint: &str,
        method: &str,
        custom_rate: Option<u32>,
        custom_burst: Option<u32>,
    ) -> RateLimitResult {
        self.check_limit_at(client_id, endpoint, method, custom_rate, custom_burst, Instant::now())
    }

    fn check_limit_at(
        &self,
        client_id: &str,
        endpoint: &str,
        method: &str,
        custom_rate: Option<u32>,
        custom_burst: Option<u32>,
        now: Instant,
    ) -> RateLimitResult {
        // 1. Global gate: reserved for a cluster-wide bucket. Single
        // instance deployment, always allows.

        let mut state = self.state.lock().expect("rate limiter mutex poisoned");

        if !state.clients.contains_key(client_id) {
            if state.clients.len() >= self.config.max_clients {
                return RateLimitResult::deny(
                    DenialReason::MaxClientsReached,
                    0,
                    Duration::from_secs(60),
                    epoch_now() + 60,
                );
            }
            let rate = custom_rate.unwrap_or_else(|| self.current_limit());
            let burst = custom_burst.unwrap_or(self.config.default_burst_limit);
            state.clients.insert(
                client_id.to_string(),
                ClientLimiter::new(
                    rate,
                    burst,
                    self.config.burst_window,
                    self.config.burst_threshold,
                    now,
                ),
            );
        }

        let client = state.clients.get_mut(client_id).expect("client inserted above");
        client.last_request = now;

        // Burst detector: independent of the token buckets below. The
        // request that trips detection is still recorded, so the next
        // call sees it.
        let bursting = client.burst.is_bursting(now);
        client.burst.record_request(now);
        if bursting {
            client.record_denial();
            self.emit(RateLimiterEvent::Denied {
                client_id: client_id.to_string(),
                endpoint: endpoint.to_string(),
                reason: DenialReason::BurstDetected,
                timestamp: now,
            });
            return RateLimitResult::deny(
                DenialReason::BurstDetected,
                client.bucket.remaining(),
                Duration::from_secs(60),
                epoch_now() + 60,
            );
        }

        // 2. Client gate (peek only — don't commit yet).
        if !client.bucket.peek(now) {
            client.record_denial();
            let retry_after = client.bucket.retry_after();
            let remaining = client.bucket.remaining();
            self.emit(RateLimiterEvent::Denied {
                client_id: client_id.to_string(),
                endpoint: endpoint.to_string(),
                reason: DenialReason::ClientQuotaExhausted,
                timestamp: now,
            });
            return RateLimitResult::deny(
                DenialReason::ClientQuotaExhausted,
                remaining,
                retry_after,
                epoch_now() + retry_after.as_secs(),
            );
        }

        // 3. Endpoint gate, only if this endpoint has a configured limit
        // that applies to this method.
        if let Some(limit) = self.config.endpoint_limit_for(endpoint, method) {
            let rate = limit.rpm;
            let burst = limit.burst;
            let bucket = client.endpoint_bucket(endpoint, rate, burst, now);
            if !bucket.peek(now) {
                let retry_after = bucket.retry_after();
                let remaining = bucket.remaining();
                client.record_denial();
                self.emit(RateLimiterEvent::Denied {
                    client_id: client_id.to_string(),
                    endpoint: endpoint.to_string(),
                    reason: DenialReason::EndpointQuotaExhausted,
                    timestamp: now,
                });
                return RateLimitResult::deny(
                    DenialReason::EndpointQuotaExhausted,
                    remaining,
                    retry_after,
                    epoch_now() + retry_after.as_secs(),
                );
            }
            bucket.consume_one();
        }

        client.bucket.consume_one();
        let remaining = client.bucket.remaining();
        self.emit(RateLimiterEvent::Allowed {
            client_id: client_id.to_string(),
            endpoint: endpoint.to_string(),
            timestamp: now,
        });
        #[cfg(feature = "metrics")]
        record_allowed_metric();

        RateLimitResult::allow(remaining, epoch_now() + 60)
    }

    /// Atomically changes a client's rate and burst, clamping its
    /// current token count to the new burst ceiling.
    pub fn update_client_limit(&self, client_id: &str, rate: u32, burst: u32) {
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");
        if let Some(client) = state.clients.get_mut(client_id) {
            client.bucket.set_limit(rate, burst);
        }
    }

    /// Restores a client's tokens to its burst ceiling, on both the
    /// client bucket and every tracked endpoint bucket.
    pub fn reset_client(&self, client_id: &str) {
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");
        if let Some(client) = state.clients.get_mut(client_id) {
            client.reset(Instant::now());
        }
    }

    /// Removes clients idle for longer than `client_ttl`. Returns the
    /// number removed.
    pub fn sweep_idle_clients(&self) -> usize {
        let now = Instant::now();
        let ttl = self.config.client_ttl;
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");
        let evicted: Vec<String> = state
            .clients
            .iter()
            .filter(|(_, client)| now.saturating_duration_since(client.last_request) > ttl)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &evicted {
            state.clients.remove(id);
        }
        drop(state);
        for id in &evicted {
            self.emit(RateLimiterEvent::ClientEvicted {
                client_id: id.clone(),
                timestamp: now,
            });
        }
        evicted.len()
    }

    pub fn client_count(&self) -> usize {
        self.state.lock().expect("rate limiter mutex poisoned").clients.len()
    }

    pub fn blocked_requests_for(&self, client_id: &str) -> Option<u64> {
        self.state
            .lock()
            .expect("rate limiter mutex poisoned")
            .clients
            .get(client_id)
            .map(|c| c.blocked_requests)
    }

    fn emit(&self, event: RateLimiterEvent) {
        if !self.listeners.is_empty() {
            self.listeners.emit(&event);
        }
    }
}

fn epoch_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(feature = "metrics")]
fn record_allowed_metric() {
    metrics::counter!("sidecar_ratelimiter_allowed_total").increment(1);
}
