//! Failure classification and the coordinator's own error type.

use std::fmt;

/// Implemented by a downstream call's error type so the coordinator can
/// decide whether a cached fallback should paper over the failure.
///
/// Timeouts, connection-refused, and 5xx-equivalents should return
/// `true`. Input-validation and authorization failures should return
/// `false` — they are passed through unchanged and never cached.
pub trait DownstreamFailure: fmt::Debug {
    fn should_fallback(&self) -> bool;
}

/// What [`DegradationCoordinator::execute`](crate::DegradationCoordinator::execute)
/// can fail with.
#[derive(Debug)]
pub enum DegradationError<E> {
    /// The downstream call failed with an error that should not be
    /// papered over (input validation, auth) — carried through as-is.
    PassThrough(E),
    /// The downstream call failed in a fallback-eligible way, but
    /// nothing was cached for this `(service, operation)`.
    FallbackMiss,
}

impl<E: fmt::Display> fmt::Display for DegradationError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradationError::PassThrough(err) => write!(f, "{err}"),
            DegradationError::FallbackMiss => write!(f, "service unavailable"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for DegradationError<E> {}
