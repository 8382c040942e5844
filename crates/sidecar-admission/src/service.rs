//! The admission `Service`: resolves client identity, normalizes the
//! endpoint, consults the rate limiter, and decorates the response.

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use http::{Request, Response};
use sidecar_ratelimiter::RateLimiter;
use tower::Service;

use crate::error::AdmissionError;
use crate::identity::resolve_client_id;
use crate::normalize::{endpoint_key, is_exempt};

/// Request-extension override for the rate limiter's `customRate`/
/// `customBurst` parameters. Absent by default; an upstream layer may
/// insert one for a specific client tier.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitOverride {
    pub rate: u32,
    pub burst: u32,
}

/// Wraps an inner service with the rate limiter's three gates.
pub struct AdmissionService<S> {
    inner: S,
    limiter: Arc<RateLimiter>,
}

impl<S> AdmissionService<S> {
    pub fn new(inner: S, limiter: Arc<RateLimiter>) -> Self {
        Self { inner, limiter }
    }
}

impl<S: Clone> Clone for AdmissionService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            limiter: Arc::clone(&self.limiter),
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AdmissionService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::error::Error + Send + Sync + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = AdmissionError<S::Error>;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(AdmissionError::Inner)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let path = req.uri().path().to_string();

        if is_exempt(&path) {
            let mut inner = self.inner.clone();
            return Box::pin(async move { inner.call(req).await.map_err(AdmissionError::Inner) });
        }

        let method = req.method().to_string();
        let client_id = resolve_client_id(&req);
        let endpoint = endpoint_key(&method, &path);
        let override_limit = req.extensions().get::<RateLimitOverride>().copied();
        let limiter = Arc::clone(&self.limiter);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let (custom_rate, custom_burst) = match override_limit {
                Some(o) => (Some(o.rate), Some(o.burst)),
                None => (None, None),
            };
            let result = limiter.check_limit(&client_id, &endpoint, &method, custom_rate, custom_burst);

            if !result.allowed {
                return Err(AdmissionError::Denied(result));
            }

            let mut response = inner.call(req).await.map_err(AdmissionError::Inner)?;
            decorate_headers(response.headers_mut(), &result);
            Ok(response)
        })
    }
}

fn decorate_headers(headers: &mut http::HeaderMap, result: &sidecar_ratelimiter::RateLimitResult) {
    if let Ok(value) = http::HeaderValue::from_str(&result.remaining.to_string()) {
        headers.insert("x-ratelimit-remaining", value);
    }
    if let Ok(value) = http::HeaderValue::from_str(&result.reset_time.to_string()) {
        headers.insert("x-ratelimit-reset", value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidecar_ratelimiter::RateLimiterConfig;
    use std::convert::Infallible;
    use tower::service_fn;
    use tower::ServiceExt;

    fn limiter(burst: u32) -> Arc<RateLimiter> {
        Arc::new(RateLimiter::new(RateLimiterConfig {
            default_rate_limit: 60,
            default_burst_limit: burst,
            ..RateLimiterConfig::default()
        }))
    }

    fn echo_service() -> tower::util::ServiceFn<
        fn(Request<()>) -> std::future::Ready<Result<Response<()>, Infallible>>,
    > {
        service_fn((|_req: Request<()>| std::future::ready(Ok::<_, Infallible>(Response::new(())))) as fn(_) -> _)
    }

    #[tokio::test]
    async fn exempt_paths_bypass_the_limiter_entirely() {
        let mut svc = AdmissionService::new(echo_service(), limiter(0));
        let req = Request::builder().uri("/health").body(()).unwrap();
        let result = svc.ready().await.unwrap().call(req).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn allowed_request_gets_rate_limit_headers() {
        let mut svc = AdmissionService::new(echo_service(), limiter(5));
        let req = Request::builder().uri("/api/v1/sessions").body(()).unwrap();
        let response = svc.ready().await.unwrap().call(req).await.unwrap();
        assert!(response.headers().contains_key("x-ratelimit-remaining"));
        assert!(response.headers().contains_key("x-ratelimit-reset"));
    }

    #[tokio::test]
    async fn exhausted_client_bucket_denies_with_the_result() {
        let mut svc = AdmissionService::new(echo_service(), limiter(1));
        let req1 = Request::builder().uri("/api/v1/sessions").body(()).unwrap();
        svc.ready().await.unwrap().call(req1).await.unwrap();

        let req2 = Request::builder().uri("/api/v1/sessions").body(()).unwrap();
        let result = svc.ready().await.unwrap().call(req2).await;
        assert!(matches!(result, Err(AdmissionError::Denied(_))));
    }
}
