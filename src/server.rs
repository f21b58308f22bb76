//! HTTP server initialization and runtime setup.
//!
//! Handles storage setup, worker spawning, and the Axum server lifecycle.

use crate::application::services::{KeyAllocator, LinkService, StatsService};
use crate::config::{Config, StorageBackend};
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::infrastructure::persistence::{
    MemoryClickRepository, MemoryLinkRepository, PgClickRepository, PgLinkRepository,
};
use crate::rate_limit::RateLimiter;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Link and click repositories for the configured backend.
pub struct Repositories {
    pub links: Arc<dyn LinkRepository>,
    pub clicks: Arc<dyn ClickRepository>,
}

/// Opens a PostgreSQL pool with the configured limits.
///
/// # Errors
///
/// Returns an error if no database URL is configured or the connection fails.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not configured")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

/// Builds repositories for the configured storage backend.
///
/// For PostgreSQL this connects and applies pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn build_repositories(config: &Config) -> Result<Repositories> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = connect_pool(config).await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations applied");

            let pool = Arc::new(pool);
            Ok(Repositories {
                links: Arc::new(PgLinkRepository::new(pool.clone())),
                clicks: Arc::new(PgClickRepository::new(pool)),
            })
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; links are lost on restart");
            Ok(Repositories {
                links: Arc::new(MemoryLinkRepository::new()),
                clicks: Arc::new(MemoryClickRepository::new()),
            })
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (PostgreSQL pool + migrations, or in-memory)
/// - Background click worker
/// - Rate limiter and its bucket sweeper
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Storage setup fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repositories = build_repositories(&config).await?;

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let click_worker = tokio::spawn(run_click_worker(click_rx, repositories.clicks.clone()));
    tracing::info!("Click worker started");

    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit()));
    let sweeper = rate_limiter.spawn_sweeper(config.rate_limit().window);

    let allocator = KeyAllocator::new(
        repositories.links.clone(),
        config.key_min_len,
        config.key_max_len,
    );
    let link_service = LinkService::new(
        repositories.links,
        allocator,
        config.base_url.clone(),
        config.storage_timeout(),
    );
    let stats_service = StatsService::new(repositories.clicks);

    let state = AppState::new(
        Arc::new(link_service),
        Arc::new(stats_service),
        rate_limiter,
        click_tx,
        config.behind_proxy,
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, draining background tasks");
    sweeper.shutdown().await;
    // The router (and every click sender) is gone, so the worker exits once
    // the queue is empty.
    if let Err(e) = click_worker.await {
        tracing::warn!(error = %e, "Click worker ended abnormally");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
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

    tracing::info!("Shutdown signal received");
}
