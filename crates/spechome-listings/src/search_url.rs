//! Zillow search-page URLs, which the listings API scrapes on our behalf.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{json, Map, Value};
use spechome_core::{RegionConfig, SearchFilters};

const ZILLOW_BASE: &str = "https://www.zillow.com";

/// Everything except RFC 3986 unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode `raw` for use as a single query-parameter value.
#[must_use]
pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}

/// Sold-only searches switch off every other listing category.
const SOLD_EXCLUDED_CATEGORIES: [&str; 6] = ["fsba", "fsbo", "nc", "cmsn", "auc", "fore"];

fn filter_state(filters: &SearchFilters) -> Map<String, Value> {
    let mut state = Map::new();
    state.insert("sort".to_owned(), json!({ "value": "days" }));

    if filters.sold_only {
        state.insert("rs".to_owned(), json!({ "value": true }));
        for category in SOLD_EXCLUDED_CATEGORIES {
            state.insert(category.to_owned(), json!({ "value": false }));
        }
        if let Some(lookback) = &filters.sold_in_last {
            state.insert("doz".to_owned(), json!({ "value": lookback }));
        }
    }

    if let Some(max_price) = filters.max_price.filter(|p| *p > 0) {
        state.insert("price".to_owned(), json!({ "max": max_price }));
    }
    if let Some(min_year) = filters.min_year_built {
        state.insert("built".to_owned(), json!({ "min": min_year }));
    }
    state
}

/// Build the search-page URL for `filters` within `region`.
///
/// A named city gets its own path slug and search term; its bounds are used
/// when the region knows the city. Without a city the region's default city
/// and full bounds apply.
#[must_use]
pub fn build_search_url(region: &RegionConfig, filters: &SearchFilters) -> String {
    let city = filters
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let location = city.unwrap_or(&region.default_city);
    let bounds = region.bounds_for(city);

    let search_state = json!({
        "isMapVisible": true,
        "mapBounds": bounds,
        "filterState": filter_state(filters),
        "isListVisible": true,
        "usersSearchTerm": region.search_term(location),
    });

    let sold = if filters.sold_only { "sold/" } else { "" };
    format!(
        "{ZILLOW_BASE}/{}/{sold}?searchQueryState={search_state}",
        region.slug_for(location)
    )
}
