use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use domain::services::LoggingExpirationNotifier;
use opportunity_api::{
    app::{create_app, AppState, Stores},
    config::Config,
    jobs::{
        ExpirationJob, ExpirationNotificationJob, JobScheduler, PoolMetricsJob, RateLimitPruneJob,
    },
    middleware::{init_metrics, logging::init_logging},
};
use shared::jwt::JwtConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_logging(&config.logging)?;
    init_metrics()?;

    info!("Starting Opportunity API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let jwt = JwtConfig::verifier(&config.jwt.public_key, config.jwt.leeway_secs)
        .context("invalid jwt.public_key")?;
    let addr = config.socket_addr()?;
    let jobs = config.jobs.clone();

    let state = AppState::new(config, Stores::postgres(pool.clone()), jwt);

    let mut scheduler = JobScheduler::new();
    scheduler.register(PoolMetricsJob::new(pool));
    if let Some(limiter) = state.rate_limiter.clone() {
        scheduler.register(RateLimitPruneJob::new(limiter));
    }
    if jobs.enabled {
        scheduler.register(ExpirationJob::new(
            state.opportunities.clone(),
            jobs.expiration_batch_size,
            jobs.expiration_frequency_minutes,
        ));
        scheduler.register(ExpirationNotificationJob::new(
            state.opportunities.clone(),
            Arc::new(LoggingExpirationNotifier),
            jobs.notification_interval_days,
            jobs.notification_batch_size,
            jobs.notification_frequency_minutes,
        ));
    }
    scheduler.start();

    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(30)).await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
