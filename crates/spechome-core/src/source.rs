//! Listing-source seam, search filters, and bounded multi-page fetches.

use std::fmt::Display;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::listing::{Listing, SearchPage};
use crate::proximity::{rank_by_proximity, DistanceCalibration, GeoPoint, NearbyComps};
use crate::schools::{PropertyDetails, PropertySchools};

pub const DEFAULT_TEARDOWN_MAX_PRICE: u64 = 1_000_000;
pub const DEFAULT_NEW_CONSTRUCTION_MIN_YEAR: i32 = 2015;
/// Lookback window for sold comps, in the upstream's `<n>m` month syntax.
pub const SOLD_COMPS_LOOKBACK: &str = "60m";

/// Query parameters for one listing search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub max_price: Option<u64>,
    pub min_year_built: Option<i32>,
    pub sold_only: bool,
    pub sold_in_last: Option<String>,
    pub city: Option<String>,
}

impl SearchFilters {
    /// Active for-sale listings at or under `max_price`.
    #[must_use]
    pub fn teardown_candidates(max_price: Option<u64>, city: Option<String>) -> Self {
        Self {
            max_price: Some(max_price.unwrap_or(DEFAULT_TEARDOWN_MAX_PRICE)),
            city: normalize_city(city),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sold_comps(city: Option<String>) -> Self {
        Self {
            sold_only: true,
            sold_in_last: Some(SOLD_COMPS_LOOKBACK.to_owned()),
            city: normalize_city(city),
            ..Self::default()
        }
    }

    /// Sold homes built in or after `min_year`. Always searches the whole region.
    #[must_use]
    pub fn new_construction(min_year: Option<i32>) -> Self {
        Self {
            sold_only: true,
            min_year_built: Some(min_year.unwrap_or(DEFAULT_NEW_CONSTRUCTION_MIN_YEAR)),
            ..Self::default()
        }
    }
}

fn normalize_city(city: Option<String>) -> Option<String> {
    city.map(|c| c.trim().to_owned()).filter(|c| !c.is_empty())
}

/// A paged provider of listings and property details.
pub trait ListingSource {
    type Error: Display;

    /// Fetch one 1-based page of results for `filters`.
    fn search(
        &self,
        filters: &SearchFilters,
        page: u32,
    ) -> impl Future<Output = Result<SearchPage, Self::Error>> + Send;

    fn property_details(
        &self,
        zpid: &str,
    ) -> impl Future<Output = Result<PropertyDetails, Self::Error>> + Send;
}

/// Bounds for a multi-page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePolicy {
    /// Upstream's full page size. A shorter page means there are no more.
    pub page_size: usize,
    pub max_pages: u32,
}

impl Default for PagePolicy {
    fn default() -> Self {
        Self {
            page_size: 40,
            max_pages: 39,
        }
    }
}

/// Collect results across pages, one request at a time.
///
/// Stops after `policy.max_pages`, on an empty page, on a page shorter than
/// `policy.page_size`, or on the first fetch error. A fetch error is logged
/// and whatever was collected before it is returned.
pub async fn fetch_all_pages<S>(
    source: &S,
    filters: &SearchFilters,
    policy: PagePolicy,
) -> Vec<Listing>
where
    S: ListingSource + Sync,
{
    let mut all_results: Vec<Listing> = Vec::new();

    for page in 1..=policy.max_pages {
        let response = match source.search(filters, page).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    page,
                    collected = all_results.len(),
                    error = %e,
                    "listing search failed; keeping partial results"
                );
                break;
            }
        };

        let count = response.results.len();
        all_results.extend(response.results);
        tracing::debug!(page, count, total = all_results.len(), "fetched search page");

        if count == 0 || count < policy.page_size {
            tracing::debug!(page, count, "short page; no more results");
            return all_results;
        }
    }

    tracing::debug!(
        max_pages = policy.max_pages,
        total = all_results.len(),
        "page bound reached"
    );
    all_results
}

/// Sold comps around `reference`, ranked by distance.
///
/// Pulls every page of sold comps for `city` (bounded by `policy`) and ranks
/// them with [`rank_by_proximity`].
pub async fn find_nearby<S>(
    source: &S,
    reference: GeoPoint,
    city: Option<&str>,
    radius_miles: f64,
    policy: PagePolicy,
    calibration: &DistanceCalibration,
) -> NearbyComps
where
    S: ListingSource + Sync,
{
    let filters = SearchFilters::sold_comps(city.map(str::to_owned));
    let listings = fetch_all_pages(source, &filters, policy).await;
    tracing::info!(
        fetched = listings.len(),
        city = city.unwrap_or(""),
        radius_miles,
        "ranking nearby comps"
    );
    rank_by_proximity(reference, city, radius_miles, listings, calibration)
}

/// Look up a property's details and resolve its school district.
///
/// # Errors
///
/// Returns the source's error when the detail lookup fails.
pub async fn property_schools<S>(source: &S, zpid: &str) -> Result<PropertySchools, S::Error>
where
    S: ListingSource + Sync,
{
    let details = source.property_details(zpid).await?;
    tracing::debug!(zpid, schools = details.schools.len(), "fetched property details");
    Ok(PropertySchools::from_details(zpid, details))
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
