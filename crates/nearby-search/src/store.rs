//! The geo store seam and its Postgres-backed implementation.

use async_trait::async_trait;
use nearby_core::{Coordinate, PlaceRecord};
use nearby_db::{DbError, NearbyFilter};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("geo store unavailable: {0}")]
    Unavailable(#[from] DbError),
    #[error("unknown place {0}")]
    UnknownPlace(Uuid),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Unavailable(DbError::from(e))
    }
}

/// Spatial data store consulted by the search service.
///
/// The store is the authority on the radius predicate; callers do not
/// re-filter what `proximity_search` returns.
#[async_trait]
pub trait GeoStore: Send + Sync {
    /// Records within `radius_meters` of `center`, matching `kind` exactly
    /// and `keyword` as a case-insensitive substring of the name when given,
    /// capped at `limit`.
    async fn proximity_search(
        &self,
        center: Coordinate,
        radius_meters: i32,
        kind: Option<&str>,
        keyword: Option<&str>,
        limit: i32,
    ) -> Result<Vec<PlaceRecord>, StoreError>;

    /// Authoritative distance in meters from a stored place to `point`.
    async fn distance_to(&self, id: Uuid, point: Coordinate) -> Result<f64, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PlaceRecord>, StoreError>;

    /// Total stored records. Diagnostic only.
    async fn count(&self) -> Result<i64, StoreError>;
}

/// [`GeoStore`] over the `PostGIS` `places` table.
#[derive(Debug, Clone)]
pub struct PgGeoStore {
    pool: PgPool,
}

impl PgGeoStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GeoStore for PgGeoStore {
    async fn proximity_search(
        &self,
        center: Coordinate,
        radius_meters: i32,
        kind: Option<&str>,
        keyword: Option<&str>,
        limit: i32,
    ) -> Result<Vec<PlaceRecord>, StoreError> {
        let rows = nearby_db::find_nearby_places(
            &self.pool,
            NearbyFilter {
                center,
                radius_meters,
                kind,
                keyword,
                limit,
            },
        )
        .await?;

        Ok(rows.into_iter().map(PlaceRecord::from).collect())
    }

    async fn distance_to(&self, id: Uuid, point: Coordinate) -> Result<f64, StoreError> {
        nearby_db::distance_to_place(&self.pool, id, point)
            .await?
            .ok_or(StoreError::UnknownPlace(id))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PlaceRecord>, StoreError> {
        let row = nearby_db::get_place_by_id(&self.pool, id).await?;
        Ok(row.map(PlaceRecord::from))
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(nearby_db::count_places(&self.pool).await?)
    }
}
