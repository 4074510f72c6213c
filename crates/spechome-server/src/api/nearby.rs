use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use spechome_core::{find_nearby, GeoPoint, NearbyComps};

use crate::middleware::RequestId;

use super::{parse_param, ApiError, ApiResponse, AppState};

const DEFAULT_RADIUS_MILES: f64 = 1.0;

#[derive(Debug, Deserialize)]
pub(super) struct NearbyQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub city: Option<String>,
    pub radius: Option<String>,
}

fn finite(raw: Option<&str>) -> Option<f64> {
    parse_param::<f64>(raw).filter(|v| v.is_finite())
}

/// Recent sold comps around a point, walking every page of the city's
/// sold listings.
pub(super) async fn get_nearby_comps(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<ApiResponse<NearbyComps>>, ApiError> {
    let (Some(lat), Some(lng)) = (finite(query.lat.as_deref()), finite(query.lng.as_deref()))
    else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "lat and lng required",
        ));
    };
    let radius = finite(query.radius.as_deref())
        .filter(|r| *r >= 0.0)
        .unwrap_or(DEFAULT_RADIUS_MILES);
    let city = query.city.as_deref().map(str::trim).filter(|c| !c.is_empty());

    let nearby = find_nearby(
        state.client.as_ref(),
        GeoPoint { lat, lng },
        city,
        radius,
        state.config.page_policy(),
        &state.client.region().distance,
    )
    .await;

    Ok(ApiResponse::ok(nearby, req_id))
}
