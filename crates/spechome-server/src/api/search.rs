use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use spechome_core::{SearchFilters, SearchPage};

use crate::middleware::RequestId;

use super::{normalize_page, parse_param, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct TeardownQuery {
    pub max_price: Option<String>,
    pub page: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SoldCompsQuery {
    pub page: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NewConstructionQuery {
    pub min_year: Option<String>,
    pub page: Option<String>,
}

/// One page of search results, or an empty page if the upstream call fails.
pub(super) async fn search_or_empty(
    state: &AppState,
    filters: &SearchFilters,
    page: u32,
) -> SearchPage {
    match state.client.search_page(filters, page).await {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!(
                error = %e,
                page,
                sold_only = filters.sold_only,
                "listing search failed; returning empty page"
            );
            SearchPage::empty()
        }
    }
}

pub(super) async fn search_teardowns(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TeardownQuery>,
) -> Json<ApiResponse<SearchPage>> {
    let filters = SearchFilters::teardown_candidates(
        parse_param(query.max_price.as_deref()),
        query.city,
    );
    let page = normalize_page(query.page.as_deref());
    ApiResponse::ok(search_or_empty(&state, &filters, page).await, req_id)
}

pub(super) async fn search_sold_comps(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SoldCompsQuery>,
) -> Json<ApiResponse<SearchPage>> {
    let filters = SearchFilters::sold_comps(query.city);
    let page = normalize_page(query.page.as_deref());
    ApiResponse::ok(search_or_empty(&state, &filters, page).await, req_id)
}

pub(super) async fn search_new_construction(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<NewConstructionQuery>,
) -> Json<ApiResponse<SearchPage>> {
    let filters = SearchFilters::new_construction(parse_param(query.min_year.as_deref()));
    let page = normalize_page(query.page.as_deref());
    ApiResponse::ok(search_or_empty(&state, &filters, page).await, req_id)
}
