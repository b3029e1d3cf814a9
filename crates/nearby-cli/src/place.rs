//! `search` and `place` command handlers.
//!
//! Both go through the same search service the HTTP server uses, so the
//! output matches the API response bodies exactly.

use std::sync::Arc;

use nearby_core::{AppConfig, SearchQuery};
use nearby_search::{NearbySearchService, PgGeoStore, QueryCache};
use sqlx::PgPool;
use uuid::Uuid;

fn build_service(pool: &PgPool, config: &AppConfig) -> NearbySearchService {
    NearbySearchService::new(
        Arc::new(PgGeoStore::new(pool.clone())),
        QueryCache::unbounded(),
    )
    .with_distance_concurrency(config.distance_concurrency)
}

pub(crate) async fn run_search(
    pool: &PgPool,
    config: &AppConfig,
    query: &SearchQuery,
) -> anyhow::Result<()> {
    let service = build_service(pool, config);
    let response = service.resolve(query).await?;

    let stats = service.stats();
    if stats.store_failures > 0 {
        tracing::warn!(
            store_failures = stats.store_failures,
            "proximity search failed; empty result reflects a store error"
        );
    }

    println!("{}", serde_json::to_string_pretty(&*response)?);
    Ok(())
}

pub(crate) async fn run_place(pool: &PgPool, config: &AppConfig, id: Uuid) -> anyhow::Result<()> {
    let service = build_service(pool, config);
    match service.find_by_id(id).await? {
        Some(place) => println!("{}", serde_json::to_string_pretty(&place)?),
        None => anyhow::bail!("place {id} not found"),
    }
    Ok(())
}
