//! Admission layer for the session-sidecar resilience core.
//!
//! The only component that talks HTTP: resolves client identity,
//! normalizes the endpoint into the rate limiter's key shape, checks
//! the three gates, and decorates allowed responses with rate-limit
//! headers. Denials surface as [`AdmissionError::Denied`] carrying the
//! full `RateLimitResult`, so the outer HTTP layer builds the
//! structured 429 body.

mod error;
mod identity;
mod layer;
mod normalize;
mod service;

pub use error::AdmissionError;
pub use identity::{resolve_client_id, AuthenticatedPrincipal, ClientIp};
pub use layer::AdmissionLayer;
pub use normalize::{endpoint_key, is_exempt, normalize_path, EXEMPT_PATHS};
pub use service::{AdmissionService, RateLimitOverride};
