use nearby_core::{PlaceRecord, PlaceResult};

/// Copy a stored record into its outward shape, attaching the distance if any.
#[must_use]
pub fn to_result(record: PlaceRecord, distance_meters: Option<f64>) -> PlaceResult {
    PlaceResult {
        id: record.id,
        name: record.name,
        kind: record.kind,
        address: record.address,
        location: record.location,
        rating: record.rating,
        distance_meters,
    }
}
