//! The axum dispatch surface. Exempt routes bypass the admission layer
//! entirely; everything under `/api/v1` is wrapped by it. Rate-limit
//! header decoration and the structured 429 body live here, not in the
//! core crates (§10.4): the core stays transport-agnostic and only ever
//! hands back a plain `RateLimitResult`.

mod handlers;

use std::convert::Infallible;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::error_handling::HandleErrorLayer;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use sidecar_admission::AdmissionLayer;
use sidecar_admission::AdmissionError;
use sidecar_degradation::DegradationCoordinator;
use sidecar_governor::PerformanceGovernor;
use sidecar_ratelimiter::RateLimiter;
use tower::ServiceBuilder;

use crate::collab::llm::LlmClient;
use crate::collab::store::SessionStore;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub llm: Arc<dyn LlmClient>,
    pub degradation: Arc<DegradationCoordinator>,
    pub governor: Arc<PerformanceGovernor>,
    pub prometheus: Option<PrometheusHandle>,
    /// Count of requests currently being handled. Fed to the governor's
    /// sampler as its `queued_requests` approximation — see
    /// `crate::runtime::ProcessRuntimeSampler`.
    pub inflight: Arc<AtomicU32>,
}

/// Builds the full router: health/metrics routes bypass admission, the
/// `/api/v1` prefix is wrapped by the rate limiter.
pub fn build_router(state: AppState, limiter: Arc<RateLimiter>) -> Router {
    let api = Router::new()
        .route("/sessions", get(handlers::list_sessions).post(handlers::create_session))
        .route("/sessions/search", get(handlers::search_sessions))
        .route(
            "/sessions/{id}",
            get(handlers::get_session).put(handlers::update_session),
        )
        .route("/compress", post(handlers::compress))
        .route("/topics", post(handlers::extract_topics))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_admission_error))
                .layer(AdmissionLayer::new(limiter)),
        );

    Router::new()
        .route("/health", get(health))
        .route("/ready", get(health))
        .route("/live", get(health))
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api)
        .layer(middleware::from_fn_with_state(state.clone(), track_inflight))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn track_inflight(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.inflight.fetch_add(1, Ordering::Relaxed);
    let response = next.run(request).await;
    state.inflight.fetch_sub(1, Ordering::Relaxed);
    response
}

/// Translates a denied or (unreachable) inner admission failure into the
/// structured 429 body and headers from §6.
async fn handle_admission_error(err: AdmissionError<Infallible>) -> Response {
    match err {
        AdmissionError::Denied(result) => {
            let reset_time: DateTime<Utc> = DateTime::from_timestamp(result.reset_time as i64, 0).unwrap_or_else(Utc::now);
            let body = Json(json!({
                "error": "rate_limited",
                "message": result.reason.map(|r| r.message()).unwrap_or("too many requests"),
                "retry_after": result.retry_after.as_secs(),
                "reset_time": reset_time.to_rfc3339(),
                "timestamp": Utc::now().to_rfc3339(),
            }));

            let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
            let headers = response.headers_mut();
            if let Ok(value) = axum::http::HeaderValue::from_str(&result.retry_after.as_secs().to_string()) {
                headers.insert(axum::http::header::RETRY_AFTER, value);
            }
            if let Ok(value) = axum::http::HeaderValue::from_str(&result.remaining.to_string()) {
                headers.insert("x-ratelimit-remaining", value);
            }
            if let Ok(value) = axum::http::HeaderValue::from_str(&result.reset_time.to_string()) {
                headers.insert("x-ratelimit-reset", value);
            }
            response
        }
        AdmissionError::Inner(never) => match never {},
    }
}
