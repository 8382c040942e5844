//! Token-bucket arithmetic shared by the client and endpoint gates.

use std::time::{Duration, Instant};

/// A single token bucket: `rate` requests per minute, refilling up to
/// `burst` tokens.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    pub rate: u32,
    pub burst: u32,
    pub tokens: f64,
    pub last_refill: Instant,
}

impl TokenBucket {
    pub fn new(rate: u32, burst: u32, now: Instant) -> Self {
        Self {
            rate,
            burst,
            tokens: burst as f64,
            last_refill: now,
        }
    }

    /// Refills based on elapsed time since `last_refill`. `last_refill`
    /// only advances when tokens were actually added, matching the
    /// "only when tokens are actually added" rule — this keeps fractional
    /// sub-token elapsed time from being silently dropped between calls.
    pub(crate) fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        let added = (elapsed * self.rate as f64 / 60.0).floor();
        if added >= 1.0 {
            self.tokens = (self.tokens + added).min(self.burst as f64);
            self.last_refill = now;
        }
    }

    /// Attempts to consume a single token, refilling first. Returns
    /// `true` if a token was available and consumed.
    pub fn try_consume(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Refills, then reports whether a token is available, without
    /// consuming it. Used when a later gate may still veto the request
    /// and the caller must not commit consumption until every gate
    /// agrees to allow.
    pub fn peek(&mut self, now: Instant) -> bool {
        self.refill(now);
        self.tokens >= 1.0
    }

    /// Consumes one token. Callers must have confirmed availability via
    /// `peek` in the same critical section first.
    pub fn consume_one(&mut self) {
        self.tokens -= 1.0;
    }

    /// Time until at least one token will be available, assuming no
    /// further consumption.
    pub fn retry_after(&self) -> Duration {
        if self.rate == 0 {
            return Duration::from_secs(60);
        }
        Duration::from_secs_f64(1.0 / (self.rate as f64 / 60.0))
    }

    pub fn remaining(&self) -> u32 {
        self.tokens.floor().max(0.0) as u32
    }

    /// Updates rate/burst in place, clamping current tokens to the new
    /// burst ceiling.
    pub fn set_limit(&mut self, rate: u32, burst: u32) {
        self.rate = rate;
        self.burst = burst;
        self.tokens = self.tokens.min(burst as f64);
    }

    pub fn reset(&mut self, now: Instant) {
        self.tokens = self.burst as f64;
        self.last_refill = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_full() {
        let bucket = TokenBucket::new(60, 10, Instant::now());
        assert_eq!(bucket.remaining(), 10);
    }

    #[test]
    fn consumes_one_token_per_call() {
        let mut bucket = TokenBucket::new(60, 10, Instant::now());
        let now = Instant::now();
        assert!(bucket.try_consume(now));
        assert_eq!(bucket.remaining(), 9);
    }

    #[test]
    fn denies_when_exhausted() {
        let now = Instant::now();
        let mut bucket = TokenBucket::new(60, 1, now);
        assert!(bucket.try_consume(now));
        assert!(!bucket.try_consume(now));
    }

    #[test]
    fn refill_is_linear_in_elapsed_time() {
        let now = Instant::now();
        let mut bucket = TokenBucket::new(60, 10, now);
        for _ in 0..10 {
            bucket.try_consume(now);
        }
        assert_eq!(bucket.remaining(), 0);

        let later = now + Duration::from_secs(30);
        bucket.refill(later);
        assert_eq!(bucket.remaining(), 10.min(10));
    }

    #[test]
    fn refill_caps_at_burst() {
        let now = Instant::now();
        let mut bucket = TokenBucket::new(60, 5, now);
        bucket.try_consume(now);
        let later = now + Duration::from_secs(600);
        bucket.refill(later);
        assert_eq!(bucket.remaining(), 5);
    }

    #[test]
    fn set_limit_clamps_existing_tokens() {
        let now = Instant::now();
        let mut bucket = TokenBucket::new(60, 10, now);
        bucket.set_limit(60, 3);
        assert_eq!(bucket.remaining(), 3);
    }

    #[test]
    fn reset_restores_to_burst() {
        let now = Instant::now();
        let mut bucket = TokenBucket::new(60, 10, now);
        bucket.try_consume(now);
        bucket.reset(now);
        assert_eq!(bucket.remaining(), 10);
    }
}
