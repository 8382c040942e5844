//! Sliding-window burst detector, independent of the token buckets.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Per-client record of recent request timestamps within `burst_window`.
#[derive(Debug, Clone)]
pub struct BurstInfo {
    timestamps: VecDeque<Instant>,
    window: Duration,
    threshold: usize,
}

impl BurstInfo {
    pub fn new(window: Duration, threshold: usize) -> Self {
        Self {
            timestamps: VecDeque::new(),
            window,
            threshold,
        }
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&front) = self.timestamps.front() {
            if now.saturating_duration_since(front) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Prunes stale entries then reports whether the client is bursting.
    pub fn is_bursting(&mut self, now: Instant) -> bool {
        self.prune(now);
        self.timestamps.len() >= self.threshold
    }

    /// Records the current request. Must be called after `is_bursting`
    /// so the request that tripped detection isn't counted toward its
    /// own verdict.
    pub fn record_request(&mut self, now: Instant) {
        self.timestamps.push_back(now);
    }
}
