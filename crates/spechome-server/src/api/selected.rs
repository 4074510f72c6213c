use axum::{extract::rejection::JsonRejection, Extension, Json};
use serde::Deserialize;
use serde_json::Value;
use spechome_core::{Listing, ListingId, Shortlist};
use tower_sessions::Session;

use crate::middleware::RequestId;

use super::{map_json_rejection, ApiError, ApiResponse};

const SHORTLIST_KEY: &str = "shortlist";

#[derive(Debug, Deserialize)]
pub(super) struct RemoveRequest {
    #[serde(default)]
    pub id: Value,
}

/// Listing ids arrive as JSON strings or numbers.
fn listing_id(value: &Value) -> Option<ListingId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(ListingId(s.trim().to_owned())),
        Value::Number(n) => Some(ListingId(n.to_string())),
        _ => None,
    }
}

fn session_error(request_id: &RequestId, error: &tower_sessions::session::Error) -> ApiError {
    tracing::error!(error = %error, "session store failed");
    ApiError::new(request_id.0.clone(), "internal_error", "session unavailable")
}

async fn load_shortlist(session: &Session, req_id: &RequestId) -> Result<Shortlist, ApiError> {
    session
        .get::<Shortlist>(SHORTLIST_KEY)
        .await
        .map(Option::unwrap_or_default)
        .map_err(|e| session_error(req_id, &e))
}

async fn save_shortlist(
    session: &Session,
    shortlist: &Shortlist,
    req_id: &RequestId,
) -> Result<(), ApiError> {
    session
        .insert(SHORTLIST_KEY, shortlist)
        .await
        .map_err(|e| session_error(req_id, &e))
}

pub(super) async fn list_selected(
    Extension(req_id): Extension<RequestId>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<Listing>>>, ApiError> {
    let shortlist = load_shortlist(&session, &req_id).await?;
    Ok(ApiResponse::ok(shortlist.listings().to_vec(), req_id))
}

/// Adds the posted listing unless it is already on the shortlist.
pub(super) async fn add_selected(
    Extension(req_id): Extension<RequestId>,
    session: Session,
    payload: Result<Json<Listing>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<Listing>>>, ApiError> {
    let Json(listing) = payload.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;

    let mut shortlist = load_shortlist(&session, &req_id).await?;
    let added = shortlist
        .add(listing)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;
    tracing::debug!(added, size = shortlist.len(), "shortlist add");
    if added {
        save_shortlist(&session, &shortlist, &req_id).await?;
    }

    Ok(ApiResponse::ok(shortlist.listings().to_vec(), req_id))
}

pub(super) async fn remove_selected(
    Extension(req_id): Extension<RequestId>,
    session: Session,
    payload: Result<Json<RemoveRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<Listing>>>, ApiError> {
    let Json(request) = payload.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;
    let Some(id) = listing_id(&request.id) else {
        return Err(ApiError::new(req_id.0, "validation_error", "id required"));
    };

    let mut shortlist = load_shortlist(&session, &req_id).await?;
    if shortlist.remove(&id) {
        save_shortlist(&session, &shortlist, &req_id).await?;
    }

    Ok(ApiResponse::ok(shortlist.listings().to_vec(), req_id))
}
