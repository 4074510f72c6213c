use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use spechome_core::{estimate, Listing, SearchFilters, ValuationEstimate};

use crate::middleware::RequestId;

use super::search::search_or_empty;
use super::{map_json_rejection, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    pub property: Option<Listing>,
}

/// Rounded valuation for display, alongside the analysed listing.
#[derive(Debug, Serialize)]
pub(super) struct AnalysisReport {
    pub property: Listing,
    pub lot_size_sqft: f64,
    pub asking_price: f64,
    pub avg_nc_price_per_sqft: f64,
    pub avg_nc_size: f64,
    pub target_build_size: f64,
    pub target_sale_price: f64,
    pub estimated_land_cost: f64,
    pub gross_profit_potential: f64,
    pub sold_comp_count: usize,
    pub new_construction_comp_count: usize,
    pub insufficient_comps: bool,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

impl AnalysisReport {
    fn new(
        property: Listing,
        estimate: &ValuationEstimate,
        sold_comp_count: usize,
        new_construction_comp_count: usize,
    ) -> Self {
        Self {
            property,
            lot_size_sqft: estimate.lot_size_sqft.round(),
            asking_price: estimate.asking_price.round(),
            avg_nc_price_per_sqft: round_to(estimate.avg_nc_price_per_sqft, 2),
            avg_nc_size: estimate.avg_nc_size.round(),
            target_build_size: estimate.target_build_size.round(),
            target_sale_price: estimate.target_sale_price.round(),
            estimated_land_cost: estimate.estimated_land_cost.round(),
            gross_profit_potential: estimate.gross_profit_potential.round(),
            sold_comp_count,
            new_construction_comp_count,
            insufficient_comps: !estimate.has_sufficient_comps(),
        }
    }
}

/// Values a teardown candidate against the first page of recent sold comps
/// and new-construction sales.
pub(super) async fn analyze_property(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AnalysisReport>>, ApiError> {
    let Json(request) = payload.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;
    let Some(property) = request.property else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "property is required",
        ));
    };

    let limit = state.config.analyze_comp_limit;
    let mut sold_comps = search_or_empty(&state, &SearchFilters::sold_comps(None), 1)
        .await
        .results;
    sold_comps.truncate(limit);
    let mut nc_comps = search_or_empty(&state, &SearchFilters::new_construction(None), 1)
        .await
        .results;
    nc_comps.truncate(limit);

    let valuation = estimate(&property, &sold_comps, &nc_comps);
    tracing::info!(
        property_id = property.id.as_ref().map_or("", |id| id.as_str()),
        sold_comps = sold_comps.len(),
        new_construction_comps = nc_comps.len(),
        profitable = valuation.is_profitable(),
        "analyzed property"
    );

    let report = AnalysisReport::new(property, &valuation, sold_comps.len(), nc_comps.len());
    Ok(ApiResponse::ok(report, req_id))
}
