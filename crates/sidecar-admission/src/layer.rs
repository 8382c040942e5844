//! Tower layer wiring the admission service in front of a service stack.

use std::sync::Arc;

use sidecar_ratelimiter::RateLimiter;
use tower::Layer;

use crate::service::AdmissionService;

/// A Tower [`Layer`] that consults a shared [`RateLimiter`] before
/// letting a request reach the wrapped service.
#[derive(Clone)]
pub struct AdmissionLayer {
    limiter: Arc<RateLimiter>,
}

impl AdmissionLayer {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S> Layer<S> for AdmissionLayer {
    type Service = AdmissionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AdmissionService::new(inner, Arc::clone(&self.limiter))
    }
}
