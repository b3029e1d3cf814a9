use std::{
    cmp::Ordering as CmpOrdering,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use futures::{stream, StreamExt};
use nearby_core::{
    distance_meters, Coordinate, PlaceRecord, PlaceResult, SearchQuery, SearchResponse,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    cache::{CacheKey, QueryCache},
    mapper::to_result,
    store::{GeoStore, StoreError},
    SearchError,
};

pub const DEFAULT_DISTANCE_CONCURRENCY: usize = 8;

/// Point-in-time copy of the service counters.
///
/// `store_failures` counts searches answered with an empty response because
/// the store failed; callers cannot tell those apart from genuinely empty
/// areas, so this is where they show up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub store_failures: u64,
    pub distance_fallbacks: u64,
    pub distance_missing: u64,
}

#[derive(Debug, Default)]
struct Counters {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    store_failures: AtomicU64,
    distance_fallbacks: AtomicU64,
    distance_missing: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ServiceStats {
        ServiceStats {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            distance_fallbacks: self.distance_fallbacks.load(Ordering::Relaxed),
            distance_missing: self.distance_missing.load(Ordering::Relaxed),
        }
    }
}

/// Resolves nearby searches against a [`GeoStore`], memoizing responses in a
/// [`QueryCache`].
///
/// Caller input errors are the only failures `resolve` reports. A failed
/// proximity search yields an empty response; a failed per-place distance
/// lookup falls back to the local haversine calculation, and failing that
/// leaves the distance absent.
pub struct NearbySearchService {
    store: Arc<dyn GeoStore>,
    cache: QueryCache,
    distance_concurrency: usize,
    counters: Counters,
}

impl NearbySearchService {
    #[must_use]
    pub fn new(store: Arc<dyn GeoStore>, cache: QueryCache) -> Self {
        Self {
            store,
            cache,
            distance_concurrency: DEFAULT_DISTANCE_CONCURRENCY,
            counters: Counters::default(),
        }
    }

    /// Cap on in-flight `distance_to` lookups within one search.
    #[must_use]
    pub fn with_distance_concurrency(mut self, limit: usize) -> Self {
        self.distance_concurrency = limit.max(1);
        self
    }

    /// Resolve a nearby search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] if any parameter is out of
    /// bounds. Nothing is read from the store or the cache in that case.
    pub async fn resolve(&self, query: &SearchQuery) -> Result<Arc<SearchResponse>, SearchError> {
        query.validate()?;

        let key = CacheKey::from_query(query);
        if let Some(cached) = self.cache.get(&key) {
            Counters::bump(&self.counters.cache_hits);
            tracing::debug!(count = cached.count(), "nearby search served from cache");
            return Ok(cached);
        }
        Counters::bump(&self.counters.cache_misses);

        let center = query.center;
        let records = match self
            .store
            .proximity_search(
                center,
                query.radius_meters,
                query.kind_filter(),
                query.keyword_filter(),
                query.limit,
            )
            .await
        {
            Ok(records) => records,
            Err(e) => {
                Counters::bump(&self.counters.store_failures);
                tracing::warn!(
                    error = %e,
                    lat = center.latitude,
                    lng = center.longitude,
                    radius_m = query.radius_meters,
                    "proximity search failed; answering with an empty result"
                );
                // Not cached: the next identical request retries the store.
                return Ok(Arc::new(SearchResponse::empty(center, query.radius_meters)));
            }
        };

        let mut items: Vec<PlaceResult> = stream::iter(records)
            .map(|record| self.annotate(record, center))
            .buffered(self.distance_concurrency)
            .collect()
            .await;
        sort_by_distance(&mut items);

        let response = Arc::new(SearchResponse::new(center, query.radius_meters, items));
        self.cache.put(key, Arc::clone(&response));

        tracing::debug!(count = response.count(), "nearby search resolved");
        Ok(response)
    }

    /// Look up one place. The result never carries a distance.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be queried. An unknown id
    /// is `Ok(None)`.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PlaceResult>, StoreError> {
        let record = self.store.find_by_id(id).await?;
        Ok(record.map(|r| to_result(r, None)))
    }

    /// Total stored places, for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be queried.
    pub async fn count_places(&self) -> Result<i64, StoreError> {
        self.store.count().await
    }

    #[must_use]
    pub fn stats(&self) -> ServiceStats {
        self.counters.snapshot()
    }

    async fn annotate(&self, record: PlaceRecord, center: Coordinate) -> PlaceResult {
        let distance = self.candidate_distance(&record, center).await;
        to_result(record, distance)
    }

    async fn candidate_distance(&self, record: &PlaceRecord, center: Coordinate) -> Option<f64> {
        match self.store.distance_to(record.id, center).await {
            Ok(d) if d.is_finite() && d >= 0.0 => return Some(d),
            Ok(d) => {
                tracing::warn!(place_id = %record.id, distance = d, "store returned unusable distance");
            }
            Err(e) => {
                tracing::warn!(place_id = %record.id, error = %e, "distance lookup failed");
            }
        }

        if record.location.is_valid() {
            Counters::bump(&self.counters.distance_fallbacks);
            Some(distance_meters(center, record.location))
        } else {
            Counters::bump(&self.counters.distance_missing);
            tracing::warn!(place_id = %record.id, "no usable coordinate; distance left empty");
            None
        }
    }
}

impl std::fmt::Debug for NearbySearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearbySearchService")
            .field("cache", &self.cache)
            .field("distance_concurrency", &self.distance_concurrency)
            .field("stats", &self.counters.snapshot())
            .finish_non_exhaustive()
    }
}

/// Ascending by distance, absent distances last. Stable, so ties and the
/// absent tail keep the store's order.
fn sort_by_distance(items: &mut [PlaceResult]) {
    items.sort_by(|a, b| match (a.distance_meters, b.distance_meters) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        (None, None) => CmpOrdering::Equal,
    });
}
