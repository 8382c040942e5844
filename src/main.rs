use std::path::PathBuf;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use sidecar_cache::FallbackCache;
use sidecar_degradation::DegradationCoordinator;
use sidecar_governor::{GovernorConfig, NoopReclaimer, PerformanceGovernor};
use sidecar_ratelimiter::RateLimiter;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use session_sidecar::collab::llm::StubLlmClient;
use session_sidecar::collab::store::SqliteSessionStore;
use session_sidecar::config::Config;
use session_sidecar::http::{build_router, AppState};
use session_sidecar::runtime::ProcessRuntimeSampler;

#[derive(Parser)]
#[command(name = "session-sidecar", about = "Resilience sidecar for an editor plugin's AI session features")]
struct Cli {
    /// Path to a config file (without extension), overriding `config/default`.
    #[arg(long)]
    config: Option<String>,

    /// Override the server bind address (e.g. "0.0.0.0:9000").
    #[arg(long)]
    bind: Option<String>,

    /// Override the SQLite database file path.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_sidecar=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    tracing::info!("starting session-sidecar");

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .map(Some)
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to install prometheus recorder, /metrics will be empty");
            None
        });

    let db_path = cli.db_path.map(|p| p.to_string_lossy().into_owned()).unwrap_or(config.database.path.clone());
    let connect_options = SqliteConnectOptions::new().filename(&db_path).create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(5).connect_with(connect_options).await?;

    let store = SqliteSessionStore::new(pool);
    store.init_tables().await?;
    tracing::info!(db_path, "database ready");

    let rate_limiter_config = config.rate_limiter_config();
    let cleanup_interval = rate_limiter_config.cleanup_interval;

    let cache = Arc::new(FallbackCache::new(config.cache_config()));
    let limiter = Arc::new(RateLimiter::new(rate_limiter_config));
    let degradation = Arc::new(DegradationCoordinator::new(Arc::clone(&cache)));

    let inflight = Arc::new(AtomicU32::new(0));
    let sampler = Arc::new(ProcessRuntimeSampler::new(Arc::clone(&inflight)));
    let governor_config: GovernorConfig = config.governor_config();
    let governor = Arc::new(PerformanceGovernor::new(
        governor_config,
        Arc::clone(&limiter),
        sampler,
        Arc::new(NoopReclaimer),
    ));

    let (shutdown_handle, shutdown_signal) = sidecar_core::shutdown_channel();

    let mut tasks = vec![sidecar_cache::spawn_sweeper(
        Arc::clone(&cache),
        sidecar_cache::DEFAULT_SWEEP_INTERVAL,
        shutdown_signal.clone(),
    )];
    tasks.push(sidecar_ratelimiter::spawn_sweeper(
        Arc::clone(&limiter),
        cleanup_interval,
        shutdown_signal.clone(),
    ));
    tasks.extend(sidecar_governor::spawn_timers(Arc::clone(&governor), shutdown_signal.clone()));

    let state = AppState {
        store: Arc::new(store),
        llm: Arc::new(StubLlmClient),
        degradation,
        governor,
        prometheus,
        inflight,
    };

    let app = build_router(state, limiter);

    let bind_addr = cli.bind.unwrap_or_else(|| format!("{}:{}", config.server.bind, config.server.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(bind_addr, "listening");

    let shutdown_future = async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
        shutdown_handle.shutdown();
    };

    axum::serve(listener, app).with_graceful_shutdown(shutdown_future).await?;

    for task in tasks {
        let _ = task.await;
    }

    Ok(())
}
