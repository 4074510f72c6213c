use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use spechome_core::{property_schools, PropertySchools};

use crate::middleware::RequestId;

use super::{map_upstream_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct PropertyDetailsQuery {
    pub zpid: Option<String>,
}

pub(super) async fn get_property_details(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PropertyDetailsQuery>,
) -> Result<Json<ApiResponse<PropertySchools>>, ApiError> {
    let Some(zpid) = query
        .zpid
        .map(|z| z.trim().to_owned())
        .filter(|z| !z.is_empty())
    else {
        return Err(ApiError::new(req_id.0, "validation_error", "zpid required"));
    };

    let report = property_schools(state.client.as_ref(), &zpid)
        .await
        .map_err(|e| {
            map_upstream_error(req_id.0.clone(), &e, "could not retrieve property details")
        })?;

    Ok(ApiResponse::ok(report, req_id))
}
