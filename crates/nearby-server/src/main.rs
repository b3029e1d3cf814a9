mod api;
mod middleware;

use std::sync::Arc;

use nearby_core::AppConfig;
use nearby_search::{NearbySearchService, PgGeoStore, QueryCache};
use sqlx::PgPool;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = nearby_core::load_app_config()?;
    init_tracing(&config)?;
    tracing::debug!(?config, "configuration loaded");

    let pool = nearby_db::connect_pool(
        &config.database_url,
        nearby_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    let applied = nearby_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let state = AppState {
        search: Arc::new(search_service(&config, &pool)),
        pool,
    };
    let app = build_app(state, RateLimitState::from_app_config(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "nearby-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    tracing::info!("nearby-server stopped");
    Ok(())
}

/// `RUST_LOG` wins over `NEARBY_LOG_LEVEL`.
fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn search_service(config: &AppConfig, pool: &PgPool) -> NearbySearchService {
    let cache = QueryCache::new(config.cache_max_entries, config.cache_ttl());
    NearbySearchService::new(Arc::new(PgGeoStore::new(pool.clone())), cache)
        .with_distance_concurrency(config.distance_concurrency)
}

/// Resolves on Ctrl-C, or SIGTERM on unix. A signal that cannot be
/// installed is logged and never fires.
async fn wait_for_shutdown() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!("ctrl-c received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
