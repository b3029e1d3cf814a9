//! Place records as stored, and the outward-facing search shapes built from them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

/// A place as held by the store. Read-only from the search side.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRecord {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub address: Option<String>,
    pub location: Coordinate,
    /// One fractional digit, within `[0.0, 5.0]`.
    pub rating: Option<Decimal>,
}

/// A place as returned to callers, optionally annotated with its distance
/// from the query center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: Option<String>,
    #[serde(flatten)]
    pub location: Coordinate,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub rating: Option<Decimal>,
    #[serde(rename = "distance_m")]
    pub distance_meters: Option<f64>,
}

/// Result of one nearby search.
///
/// `count` always equals `items.len()`; the only way to build one is through
/// [`SearchResponse::new`] or [`SearchResponse::empty`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    center: Coordinate,
    #[serde(rename = "radius")]
    radius_meters: i32,
    count: usize,
    items: Vec<PlaceResult>,
}

impl SearchResponse {
    #[must_use]
    pub fn new(center: Coordinate, radius_meters: i32, items: Vec<PlaceResult>) -> Self {
        Self {
            center,
            radius_meters,
            count: items.len(),
            items,
        }
    }

    #[must_use]
    pub fn empty(center: Coordinate, radius_meters: i32) -> Self {
        Self::new(center, radius_meters, Vec::new())
    }

    #[must_use]
    pub fn center(&self) -> Coordinate {
        self.center
    }

    #[must_use]
    pub fn radius_meters(&self) -> i32 {
        self.radius_meters
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn items(&self) -> &[PlaceResult] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(distance_meters: Option<f64>) -> PlaceResult {
        PlaceResult {
            id: Uuid::nil(),
            name: "Blue Bottle".to_string(),
            kind: "cafe".to_string(),
            address: None,
            location: Coordinate {
                latitude: 37.7764,
                longitude: -122.4232,
            },
            rating: Some(Decimal::new(45, 1)),
            distance_meters,
        }
    }

    #[test]
    fn place_result_uses_wire_field_names() {
        let json = serde_json::to_value(sample_result(Some(12.5))).expect("serialize");
        assert_eq!(json["type"], "cafe");
        assert_eq!(json["lat"], 37.7764);
        assert_eq!(json["lng"], -122.4232);
        assert_eq!(json["rating"], 4.5);
        assert_eq!(json["distance_m"], 12.5);
        assert!(json.get("kind").is_none());
        assert!(json.get("location").is_none());
    }

    #[test]
    fn absent_optionals_serialize_as_null() {
        let mut result = sample_result(None);
        result.rating = None;
        let json = serde_json::to_value(result).expect("serialize");
        assert!(json["distance_m"].is_null());
        assert!(json["rating"].is_null());
        assert!(json["address"].is_null());
    }

    #[test]
    fn place_result_parses_back_with_same_presence() {
        let original = sample_result(None);
        let json = serde_json::to_string(&original).expect("serialize");
        let parsed: PlaceResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, original);
    }

    #[test]
    fn response_count_tracks_items() {
        let center = Coordinate {
            latitude: 0.0,
            longitude: 0.0,
        };
        let response = SearchResponse::new(center, 500, vec![sample_result(None); 3]);
        assert_eq!(response.count(), 3);
        assert_eq!(response.items().len(), 3);

        let empty = SearchResponse::empty(center, 500);
        assert_eq!(empty.count(), 0);
        assert!(empty.items().is_empty());
    }

    #[test]
    fn response_serializes_radius_and_center() {
        let center = Coordinate {
            latitude: 37.7749,
            longitude: -122.4194,
        };
        let json = serde_json::to_value(SearchResponse::empty(center, 1000)).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "center": { "lat": 37.7749, "lng": -122.4194 },
                "radius": 1000,
                "count": 0,
                "items": []
            })
        );
    }
}
