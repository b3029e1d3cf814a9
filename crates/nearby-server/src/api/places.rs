use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use nearby_core::{Coordinate, PlaceResult, SearchQuery, DEFAULT_LIMIT, DEFAULT_RADIUS_METERS};
use nearby_search::{SearchError, ServiceStats};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, ErrorCode, ResponseMeta};

/// Raw `/nearby` query string. Everything is optional here so that missing
/// values surface as our own `validation_error` rather than a bare rejection.
#[derive(Debug, Default, Deserialize)]
pub(super) struct NearbyParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i32>,
}

impl NearbyParams {
    pub(super) fn into_query(self) -> Result<SearchQuery, String> {
        let lat = self.lat.ok_or_else(|| "lat is required".to_string())?;
        let lng = self.lng.ok_or_else(|| "lng is required".to_string())?;

        SearchQuery::new(
            Coordinate {
                latitude: lat,
                longitude: lng,
            },
            self.radius.unwrap_or(DEFAULT_RADIUS_METERS),
            self.kind,
            self.q,
            self.limit.unwrap_or(DEFAULT_LIMIT),
        )
        .map_err(|e| e.to_string())
    }
}

#[derive(Debug, Serialize)]
pub(super) struct DiagnosticsData {
    pub database: &'static str,
    pub place_count: i64,
    pub search: ServiceStats,
}

pub(super) async fn nearby_places(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) =
        params.map_err(|rejection| ApiError::validation(&req_id, rejection.body_text()))?;

    let query = params
        .into_query()
        .map_err(|message| ApiError::validation(&req_id, message))?;

    let response = state.search.resolve(&query).await.map_err(|e| match e {
        SearchError::InvalidQuery(inner) => ApiError::validation(&req_id, inner.to_string()),
    })?;

    Ok(Json(&*response).into_response())
}

pub(super) async fn get_place(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<PlaceResult>, ApiError> {
    let id = Uuid::parse_str(&raw_id)
        .map_err(|_| ApiError::validation(&req_id, format!("invalid place id: {raw_id}")))?;

    let place = state
        .search
        .find_by_id(id)
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;

    place.map(Json).ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            ErrorCode::NotFound,
            format!("place {id} not found"),
        )
    })
}

pub(super) async fn diagnostics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DiagnosticsData>>, ApiError> {
    let place_count = state
        .search
        .count_places()
        .await
        .map_err(|e| map_store_error(&req_id, &e))?;

    Ok(Json(ApiResponse {
        data: DiagnosticsData {
            database: "ok",
            place_count,
            search: state.search.stats(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
