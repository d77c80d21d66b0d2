//! Warehouse Inventory - Backend Server

use std::{net::SocketAddr, sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wms_backend::repository::PgStore;
use wms_backend::services::AnalyticsDispatcher;
use wms_backend::{create_app, AppState, Config};

const DEFAULT_LOG_FILTER: &str = "wms_server=debug,wms_backend=debug,tower_http=debug,sqlx=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Warehouse Inventory Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let store = Arc::new(PgStore::new(db_pool));

    // Analytics worker
    let (dispatcher, worker) =
        AnalyticsDispatcher::spawn(store.clone(), config.analytics.queue_capacity);
    let stats = dispatcher.stats();
    let supervisor = tokio::spawn(supervise_analytics(worker));

    // Create application state
    let state =
        AppState::new(store, Arc::new(dispatcher), &config.inventory).with_dispatch_stats(stats);

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router is gone, so the queue closes once the worker drains it
    if tokio::time::timeout(Duration::from_secs(5), supervisor).await.is_err() {
        tracing::warn!("Analytics queue was not drained before shutdown");
    }

    Ok(())
}

/// Log how the analytics worker ended
async fn supervise_analytics(worker: JoinHandle<()>) {
    match worker.await {
        Ok(()) => tracing::info!("Analytics worker exited"),
        Err(e) if e.is_panic() => tracing::error!("Analytics worker panicked: {}", e),
        Err(e) => tracing::warn!("Analytics worker cancelled: {}", e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
