//! Read operations for the `places` table.
//!
//! `location` is a `geography(Point, 4326)` column; every distance here is
//! computed by `PostGIS` on the spheroid and reported in meters.

use nearby_core::{Coordinate, PlaceRecord};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// A row from the `places` table with the point split into lat/lng.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlaceRow {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: Option<Decimal>,
}

impl From<PlaceRow> for PlaceRecord {
    fn from(row: PlaceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            kind: row.kind,
            address: row.address,
            location: Coordinate {
                latitude: row.latitude,
                longitude: row.longitude,
            },
            rating: row.rating,
        }
    }
}

/// Filters for [`find_nearby_places`].
#[derive(Debug, Clone, Copy)]
pub struct NearbyFilter<'a> {
    pub center: Coordinate,
    pub radius_meters: i32,
    /// Exact match on `type`.
    pub kind: Option<&'a str>,
    /// Case-insensitive literal substring of `name`.
    pub keyword: Option<&'a str>,
    pub limit: i32,
}

/// Places within `radius_meters` of `center`, nearest first.
///
/// Ties on distance are broken by `id` so the order is deterministic.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn find_nearby_places(
    pool: &PgPool,
    filter: NearbyFilter<'_>,
) -> Result<Vec<PlaceRow>, sqlx::Error> {
    let keyword_pattern = filter
        .keyword
        .map(|kw| format!("%{}%", escape_like(kw)));

    sqlx::query_as::<_, PlaceRow>(
        "SELECT id, name, type AS kind, address, \
                ST_Y(location::geometry) AS latitude, \
                ST_X(location::geometry) AS longitude, \
                rating \
         FROM places \
         WHERE ST_DWithin(location, ST_SetSRID(ST_MakePoint($2, $1), 4326)::geography, $3) \
           AND ($4::text IS NULL OR type = $4) \
           AND ($5::text IS NULL OR name ILIKE $5 ESCAPE '\\') \
         ORDER BY ST_Distance(location, ST_SetSRID(ST_MakePoint($2, $1), 4326)::geography) ASC, \
                  id ASC \
         LIMIT $6",
    )
    .bind(filter.center.latitude)
    .bind(filter.center.longitude)
    .bind(f64::from(filter.radius_meters))
    .bind(filter.kind)
    .bind(keyword_pattern)
    .bind(i64::from(filter.limit))
    .fetch_all(pool)
    .await
}

/// Distance in meters from the stored place to `point`.
///
/// Returns `None` when no place has this id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn distance_to_place(
    pool: &PgPool,
    place_id: Uuid,
    point: Coordinate,
) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, f64>(
        "SELECT ST_Distance(location, ST_SetSRID(ST_MakePoint($3, $2), 4326)::geography) \
         FROM places \
         WHERE id = $1",
    )
    .bind(place_id)
    .bind(point.latitude)
    .bind(point.longitude)
    .fetch_optional(pool)
    .await
}

/// Fetch a single place by its id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_place_by_id(pool: &PgPool, place_id: Uuid) -> Result<Option<PlaceRow>, sqlx::Error> {
    sqlx::query_as::<_, PlaceRow>(
        "SELECT id, name, type AS kind, address, \
                ST_Y(location::geometry) AS latitude, \
                ST_X(location::geometry) AS longitude, \
                rating \
         FROM places \
         WHERE id = $1",
    )
    .bind(place_id)
    .fetch_optional(pool)
    .await
}

/// Total number of stored places.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_places(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM places")
        .fetch_one(pool)
        .await
}

/// Escape `LIKE` metacharacters so the keyword matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
