//! `roomrate` HTTP server.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use roomrate::cache::AppCache;
use roomrate::config::Config;
use roomrate::pricing::PgRoomStore;
use roomrate::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;
    tracing::info!("Database connection established");

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let state = AppState {
        store: Arc::new(PgRoomStore::new(pool)),
        cache: AppCache::new(config.pricing_cache_ttl),
        zone: config.reference_zone,
        horizon_months: config.horizon_months,
    };

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(
        "Listening on {} (reference offset {}, horizon {} months)",
        listener.local_addr()?,
        config.reference_zone.offset(),
        config.horizon_months
    );

    axum::serve(listener, build_router(state))
        .await
        .context("server error")?;

    Ok(())
}
