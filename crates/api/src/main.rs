use std::sync::Arc;

use anyhow::{Context, Result};
use persistence::repositories::{LocationRepository, UserRepository};
use squadmap_api::{
    app,
    config::Config,
    jobs::{JobScheduler, StatusPollJob},
    middleware,
    services::TrustClient,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::init_logging(&config.logging);

    info!("Starting Squadmap API v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = middleware::init_metrics() {
        warn!(error = %e, "Metrics disabled");
    }

    let pool = persistence::db::create_pool(&config.database.pool_config())
        .await
        .context("Failed to connect to database")?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let trust = Arc::new(TrustClient::new(&config.trust)?);

    let mut scheduler = JobScheduler::new();
    StatusPollJob::register(
        &mut scheduler,
        Arc::clone(&trust),
        UserRepository::new(pool.clone()),
        LocationRepository::new(pool.clone()),
        config.status_poll.interval(),
    );
    scheduler.start();

    let addr = config.socket_addr()?;
    let shutdown_timeout = config.status_poll.shutdown_timeout();
    let app = app::create_app(config, pool, trust);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(shutdown_timeout).await;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
