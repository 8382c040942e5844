//! The outcome of a [`RateLimiter::check_limit`](crate::RateLimiter::check_limit) call.

use std::time::Duration;

/// Which gate produced a denial, mirroring the error taxonomy's
/// `RateLimited` subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    ClientQuotaExhausted,
    EndpointQuotaExhausted,
    BurstDetected,
    MaxClientsReached,
}

impl DenialReason {
    pub fn message(self) -> &'static str {
        match self {
            DenialReason::ClientQuotaExhausted => "Client rate limit exceeded",
            DenialReason::EndpointQuotaExhausted => "Endpoint rate limit exceeded",
            DenialReason::BurstDetected => "Burst protection activated",
            DenialReason::MaxClientsReached => "Maximum number of clients exceeded",
        }
    }
}

/// Result of evaluating the three gates for a single request.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub reason: Option<DenialReason>,
    /// Tokens remaining on the client gate after this call.
    pub remaining: u32,
    /// How long until the client gate would allow another request.
    pub retry_after: Duration,
    /// Epoch-seconds estimate of when the client bucket is expected to
    /// be back at its burst ceiling.
    pub reset_time: u64,
}

impl RateLimitResult {
    pub fn allow(remaining: u32, reset_time: u64) -> Self {
        Self {
            allowed: true,
            reason: None,
            remaining,
            retry_after: Duration::ZERO,
            reset_time,
        }
    }

    pub fn deny(reason: DenialReason, remaining: u32, retry_after: Duration, reset_time: u64) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            remaining,
            retry_after,
            reset_time,
        }
    }
}
