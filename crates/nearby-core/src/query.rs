//! Nearby search parameters and their declared bounds.

use crate::{geo::Coordinate, CoreError};

pub const DEFAULT_RADIUS_METERS: i32 = 3_000;
pub const MIN_RADIUS_METERS: i32 = 1;
pub const MAX_RADIUS_METERS: i32 = 20_000;

pub const DEFAULT_LIMIT: i32 = 50;
pub const MIN_LIMIT: i32 = 1;
pub const MAX_LIMIT: i32 = 200;

/// One nearby search request.
///
/// Fields are public so collaborators can assemble queries directly; anything
/// built that way is re-checked by [`SearchQuery::validate`] before use.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub center: Coordinate,
    pub radius_meters: i32,
    pub kind: Option<String>,
    pub keyword: Option<String>,
    pub limit: i32,
}

impl SearchQuery {
    /// Build a validated query. Blank `kind`/`keyword` are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidQuery`] if any parameter is out of bounds.
    pub fn new(
        center: Coordinate,
        radius_meters: i32,
        kind: Option<String>,
        keyword: Option<String>,
        limit: i32,
    ) -> Result<Self, CoreError> {
        let query = Self {
            center,
            radius_meters,
            kind: normalize_filter(kind),
            keyword: normalize_filter(keyword),
            limit,
        };
        query.validate()?;
        Ok(query)
    }

    /// Query with default radius and limit and no filters.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidQuery`] if the center is out of bounds.
    pub fn around(center: Coordinate) -> Result<Self, CoreError> {
        Self::new(center, DEFAULT_RADIUS_METERS, None, None, DEFAULT_LIMIT)
    }

    /// Check every bound. Out-of-range values are rejected, never clamped.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidQuery`] for the first violation found.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.center.validate()?;

        if !(MIN_RADIUS_METERS..=MAX_RADIUS_METERS).contains(&self.radius_meters) {
            return Err(CoreError::InvalidQuery {
                field: "radius",
                reason: format!(
                    "must be within [{MIN_RADIUS_METERS}, {MAX_RADIUS_METERS}], got {}",
                    self.radius_meters
                ),
            });
        }

        if !(MIN_LIMIT..=MAX_LIMIT).contains(&self.limit) {
            return Err(CoreError::InvalidQuery {
                field: "limit",
                reason: format!(
                    "must be within [{MIN_LIMIT}, {MAX_LIMIT}], got {}",
                    self.limit
                ),
            });
        }

        Ok(())
    }

    /// `kind` with blank values folded to `None`.
    #[must_use]
    pub fn kind_filter(&self) -> Option<&str> {
        non_blank(self.kind.as_deref())
    }

    /// `keyword` with blank values folded to `None`.
    #[must_use]
    pub fn keyword_filter(&self) -> Option<&str> {
        non_blank(self.keyword.as_deref())
    }
}

fn normalize_filter(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// Whitespace-only means absent; anything else is passed through verbatim.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
