//! Process-wide cache of resolved nearby searches.
//!
//! Keys are structural over the normalized query tuple, so no delimiter in a
//! keyword can make two different queries collide. Values are published as
//! fully built `Arc<SearchResponse>`s; readers see either nothing or a whole
//! response.

use std::{sync::Arc, time::Duration};

use moka::sync::Cache;
use nearby_core::{SearchQuery, SearchResponse};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat_bits: u64,
    lng_bits: u64,
    radius_meters: i32,
    kind: String,
    keyword: String,
    limit: i32,
}

impl CacheKey {
    /// Absent filters are keyed as the empty string.
    #[must_use]
    pub fn from_query(query: &SearchQuery) -> Self {
        Self {
            lat_bits: canonical_bits(query.center.latitude),
            lng_bits: canonical_bits(query.center.longitude),
            radius_meters: query.radius_meters,
            kind: query.kind_filter().unwrap_or_default().to_owned(),
            keyword: query.keyword_filter().unwrap_or_default().to_owned(),
            limit: query.limit,
        }
    }
}

// Adding +0.0 folds -0.0 into +0.0 and leaves every other value unchanged.
fn canonical_bits(value: f64) -> u64 {
    (value + 0.0).to_bits()
}

#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<CacheKey, Arc<SearchResponse>>,
}

impl QueryCache {
    /// Cache bounded to `max_entries`, with entries expiring after `ttl` when set.
    #[must_use]
    pub fn new(max_entries: u64, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().max_capacity(max_entries);
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            inner: builder.build(),
        }
    }

    /// Cache with no capacity bound and no expiry.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            inner: Cache::builder().build(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<SearchResponse>> {
        self.inner.get(key)
    }

    pub fn put(&self, key: CacheKey, response: Arc<SearchResponse>) {
        self.inner.insert(key, response);
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entry_count", &self.inner.entry_count())
            .finish_non_exhaustive()
    }
}
