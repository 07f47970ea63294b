//! tour_service - Tour Management Backend API
//!
//! Serves tours and their stops over HTTP. Stops are enriched with location
//! and weather data from external providers before they are stored.

use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tour_service::api::{self, AppState};
use tour_service::config::{Config, LogFormat};
use tour_service::db;
use tour_service::enrichment::StopEnricher;
use tour_service::store::{InMemoryTourStore, PgTourStore, TourStore};

/// Initialize tracing/logging
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tour_service=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Pick the store backend: Postgres when configured, in-memory otherwise
async fn build_store(config: &Config) -> anyhow::Result<(Arc<dyn TourStore>, Option<PgPool>)> {
    let Some(ref database_url) = config.database_url else {
        if config.is_production() {
            return Err(anyhow::anyhow!("DATABASE_URL is required in production"));
        }
        tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on exit)");
        return Ok((Arc::new(InMemoryTourStore::new()), None));
    };

    tracing::info!("Connecting to database...");
    let pool = db::connect(database_url, config).await?;
    db::verify_connection(&pool).await?;

    if !db::check_schema(&pool).await? {
        tracing::error!("Database schema is not complete. Please run migrations.");
        return Err(anyhow::anyhow!("Database schema incomplete"));
    }

    tracing::info!("Database connected successfully");
    Ok((Arc::new(PgTourStore::new(pool.clone())), Some(pool)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Starting tour_service ({})", config.environment);

    let (store, pool) = build_store(&config).await?;
    let enricher = StopEnricher::from_config(&config)?;

    tracing::info!(
        geocoder = %config.geocoder_url,
        weather = %config.weather_url,
        timeout_ms = config.provider_timeout.as_millis() as u64,
        "Enrichment providers configured"
    );

    let app = api::build_router(AppState::new(store, enricher));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutting down...");
    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database connections closed. Goodbye!");
    }

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
