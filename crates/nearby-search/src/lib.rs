//! Nearby-search resolution: validate a query, ask the geo store for
//! candidates, annotate them with distances, order them, and cache the result.

mod cache;
mod mapper;
mod service;
mod store;

use thiserror::Error;

pub use cache::{CacheKey, QueryCache};
pub use mapper::to_result;
pub use service::{NearbySearchService, ServiceStats, DEFAULT_DISTANCE_CONCURRENCY};
pub use store::{GeoStore, PgGeoStore, StoreError};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    InvalidQuery(#[from] nearby_core::CoreError),
}
