//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, database migrations, service wiring, and the
//! Axum server lifecycle.

use crate::application::services::ShortUrlService;
use crate::config::{Config, DatabaseConfig};
use crate::domain::code_policy::CodeGenerator;
use crate::domain::repositories::ShortUrlRepository;
use crate::infrastructure::persistence::{InMemoryShortUrlRepository, PgShortUrlRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

/// Opens a PostgreSQL pool with the configured limits and applies migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn connect_database(database: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .acquire_timeout(database.acquire_timeout)
        .connect(&database.url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;

    Ok(pool)
}

/// Builds the record store: PostgreSQL when configured, process memory otherwise.
pub async fn build_repository(config: &Config) -> Result<Arc<dyn ShortUrlRepository>> {
    match &config.database {
        Some(database) => {
            let pool = connect_database(database).await?;
            Ok(Arc::new(PgShortUrlRepository::new(Arc::new(pool))))
        }
        None => {
            tracing::warn!("Using in-memory storage; records are lost on shutdown");
            Ok(Arc::new(InMemoryShortUrlRepository::new()))
        }
    }
}

/// Wires the service over `repository` using the configured code policy.
pub fn build_state(config: &Config, repository: Arc<dyn ShortUrlRepository>) -> AppState {
    let service = ShortUrlService::new(repository, CodeGenerator::new(config.code_length))
        .with_generation_attempts(config.code_generation_attempts);

    AppState::new(Arc::new(service))
}

/// Runs the HTTP server with the given configuration.
///
/// Stops gracefully on Ctrl+C.
///
/// # Errors
///
/// Returns an error if:
/// - The store cannot be initialized
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config).await?;
    let state = build_state(&config, repository);

    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    tracing::info!("Listening on http://{}", config.listen_addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
