//! Listing records returned by the upstream search API.
//!
//! The upstream payload is camelCase JSON with every field optional. Decoding
//! policy lives here, at the deserialization boundary:
//!
//! - Numeric fields (`unformattedPrice`, `livingArea`, `lotAreaValue`,
//!   `yearBuilt`, coordinates) accept numbers or numeric strings; anything
//!   else decodes to `None`. Consumers treat `None` as "exclude from the
//!   aggregate", never as zero.
//! - `lotAreaUnit` is `"acres"` or square feet; unknown or missing units are
//!   treated as square feet.
//! - Fields this crate does not model (`imgSrc`, `beds`, the display `price`
//!   string, ...) are kept in [`Listing::extra`] and written back out
//!   unchanged, so API consumers receive the full upstream record.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::lenient;
use crate::proximity::GeoPoint;

/// Square feet in one acre.
pub const SQFT_PER_ACRE: f64 = 43_560.0;

/// Upstream listing identifier (Zillow `zpid`), normalised to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl ListingId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotAreaUnit {
    Acres,
    #[default]
    #[serde(other)]
    Sqft,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub zipcode: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLong {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub longitude: Option<f64>,
}

/// One property record from a search or comp result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(
        default,
        deserialize_with = "lenient::id_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<ListingId>,

    /// Asking price for active listings, sale price for sold ones.
    #[serde(
        rename = "unformattedPrice",
        default,
        deserialize_with = "lenient::f64_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<f64>,

    /// Livable floor area in square feet.
    #[serde(
        default,
        deserialize_with = "lenient::f64_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub living_area: Option<f64>,

    #[serde(
        rename = "lotAreaValue",
        default,
        deserialize_with = "lenient::f64_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub lot_area: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient::object_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub lot_area_unit: Option<LotAreaUnit>,

    #[serde(
        default,
        deserialize_with = "lenient::i32_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub year_built: Option<i32>,

    #[serde(
        default,
        deserialize_with = "lenient::object_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<Address>,

    #[serde(
        rename = "latLong",
        default,
        deserialize_with = "lenient::object_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub lat_long: Option<LatLong>,

    /// Miles from the reference point of a nearby-comps search. Only the
    /// proximity ranker populates this; `None` sorts as maximally distant.
    #[serde(
        default,
        deserialize_with = "lenient::f64_opt",
        serialize_with = "serialize_distance",
        skip_serializing_if = "Option::is_none"
    )]
    pub distance: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing {
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.address.as_ref()?.city.as_deref()
    }

    /// Returns the geocoordinate only when both latitude and longitude are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<GeoPoint> {
        let lat_long = self.lat_long.as_ref()?;
        Some(GeoPoint {
            lat: lat_long.latitude?,
            lng: lat_long.longitude?,
        })
    }

    /// Price, only if strictly positive.
    #[must_use]
    pub fn positive_price(&self) -> Option<f64> {
        self.price.filter(|p| *p > 0.0)
    }

    /// Living area, only if strictly positive.
    #[must_use]
    pub fn positive_living_area(&self) -> Option<f64> {
        self.living_area.filter(|a| *a > 0.0)
    }

    /// Lot size normalised to square feet. A missing lot area counts as 0.
    #[must_use]
    pub fn lot_size_sqft(&self) -> f64 {
        let value = self.lot_area.unwrap_or(0.0);
        match self.lot_area_unit.unwrap_or_default() {
            LotAreaUnit::Acres => value * SQFT_PER_ACRE,
            LotAreaUnit::Sqft => value,
        }
    }
}

#[allow(clippy::ref_option)]
fn serialize_distance<S>(distance: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match distance {
        Some(d) => serializer.serialize_f64((d * 100.0).round() / 100.0),
        None => serializer.serialize_none(),
    }
}

/// One page of search results.
///
/// Upstream error payloads carry no `results` key; they decode to an empty
/// page with `success == Some(false)` rather than failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    #[serde(default, deserialize_with = "lenient::vec_of")]
    pub results: Vec<Listing>,

    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub total_count: Option<u64>,

    #[serde(
        default,
        deserialize_with = "lenient::string_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
}

impl SearchPage {
    /// An empty page, used when the upstream source is unavailable.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            success: Some(false),
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
