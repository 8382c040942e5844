//! Per-client state: the client-gate bucket, its per-endpoint trackers,
//! and its burst detector.

use std::collections::HashMap;
use std::time::Instant;

use crate::bucket::TokenBucket;
use crate::burst::BurstInfo;

/// Per-client, per-endpoint token bucket, keyed by the normalized
/// `METHOD:path` endpoint key.
pub type EndpointTracker = HashMap<String, TokenBucket>;

/// All state the rate limiter tracks for a single client.
#[derive(Debug, Clone)]
pub struct ClientLimiter {
    pub bucket: TokenBucket,
    pub endpoints: EndpointTracker,
    pub burst: BurstInfo,
    pub blocked_requests: u64,
    pub last_request: Instant,
}

impl ClientLimiter {
    pub fn new(
        rate: u32,
        burst: u32,
        burst_window: std::time::Duration,
        burst_threshold: usize,
        now: Instant,
    ) -> Self {
        Self {
            bucket: TokenBucket::new(rate, burst, now),
            endpoints: HashMap::new(),
            burst: BurstInfo::new(burst_window, burst_threshold),
            blocked_requests: 0,
            last_request: now,
        }
    }

    pub fn endpoint_bucket(&mut self, key: &str, rate: u32, burst: u32, now: Instant) -> &mut TokenBucket {
        self.endpoints
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(rate, burst, now))
    }

    pub fn record_denial(&mut self) {
        self.blocked_requests += 1;
    }

    pub fn reset(&mut self, now: Instant) {
        self.bucket.reset(now);
        for bucket in self.endpoints.values_mut() {
            bucket.reset(now);
        }
    }
}
