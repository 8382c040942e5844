//! Shared scaffolding for the root binary's integration tests: an
//! in-memory SQLite-backed router built the same way `main.rs` wires
//! one together, minus the background sweepers and real network bind.

use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use session_sidecar::collab::llm::StubLlmClient;
use session_sidecar::collab::store::SqliteSessionStore;
use session_sidecar::http::{build_router, AppState};
use sidecar_cache::FallbackCache;
use sidecar_degradation::DegradationCoordinator;
use sidecar_governor::{GovernorConfig, NoopReclaimer, PerformanceGovernor, RuntimeSampler, RuntimeStats};
use sidecar_ratelimiter::{RateLimiter, RateLimiterConfig};
use sqlx::sqlite::SqlitePoolOptions;

/// Always reports an idle, empty runtime; the governor's optimization
/// pass is driven manually in tests rather than by a live sampler.
struct ZeroSampler;

impl RuntimeSampler for ZeroSampler {
    fn sample(&self) -> RuntimeStats {
        RuntimeStats { memory_usage_mb: 0.0, worker_count: 1, active_connections: 0, queued_requests: 0 }
    }
}

pub async fn build_test_app() -> axum::Router {
    build_test_app_with(RateLimiterConfig::default()).await
}

pub async fn build_test_app_with(rate_limiter_config: RateLimiterConfig) -> axum::Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite pool");
    let store = SqliteSessionStore::new(pool);
    store.init_tables().await.expect("init tables");

    let cache = Arc::new(FallbackCache::with_defaults());
    let limiter = Arc::new(RateLimiter::new(rate_limiter_config));
    let degradation = Arc::new(DegradationCoordinator::new(Arc::clone(&cache)));
    let governor = Arc::new(PerformanceGovernor::new(
        GovernorConfig::default(),
        Arc::clone(&limiter),
        Arc::new(ZeroSampler),
        Arc::new(NoopReclaimer),
    ));

    let state = AppState {
        store: Arc::new(store),
        llm: Arc::new(StubLlmClient),
        degradation,
        governor,
        prometheus: None,
        inflight: Arc::new(AtomicU32::new(0)),
    };

    build_router(state, limiter)
}
