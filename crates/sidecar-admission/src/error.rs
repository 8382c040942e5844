//! The admission layer's error type.

use sidecar_ratelimiter::RateLimitResult;

/// What [`AdmissionService`](crate::AdmissionService) can fail with.
///
/// Denial carries the full [`RateLimitResult`] so the HTTP layer can
/// build the structured 429 body (with RFC3339 timestamps) and the
/// `Retry-After`/`X-RateLimit-*` headers without this crate needing to
/// know about JSON or wall-clock formatting.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError<E>
where
    E: std::error::Error + 'static,
{
    #[error("too many requests")]
    Denied(RateLimitResult),
    #[error(transparent)]
    Inner(#[from] E),
}
