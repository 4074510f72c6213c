//! Nearby-comps ranking.
//!
//! Distances use a flat-earth local approximation: degree deltas are scaled
//! by fixed miles-per-degree constants and combined with Pythagoras. The
//! constants are only valid near the configured region's latitude band, so
//! they travel with the region config as a [`DistanceCalibration`] rather
//! than being hardcoded here.

use serde::{Deserialize, Serialize};

use crate::listing::Listing;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceCalibration {
    pub miles_per_degree_lat: f64,
    pub miles_per_degree_lng: f64,
}

impl Default for DistanceCalibration {
    /// Calibration for the Chicago western suburbs (~41.8°N).
    fn default() -> Self {
        Self {
            miles_per_degree_lat: 69.0,
            miles_per_degree_lng: 55.0,
        }
    }
}

impl DistanceCalibration {
    #[must_use]
    pub fn distance_miles(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        let lat_miles = (from.lat - to.lat).abs() * self.miles_per_degree_lat;
        let lng_miles = (from.lng - to.lng).abs() * self.miles_per_degree_lng;
        lat_miles.hypot(lng_miles)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityBand {
    /// `distance <= radius`
    Within,
    /// `radius < distance <= radius + 1`
    NextMile,
    Beyond,
}

impl ProximityBand {
    #[must_use]
    pub fn classify(distance: f64, radius_miles: f64) -> Self {
        if distance <= radius_miles {
            Self::Within
        } else if distance <= radius_miles + 1.0 {
            Self::NextMile
        } else {
            Self::Beyond
        }
    }
}

/// A listing annotated with its distance from the search reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityResult {
    #[serde(flatten)]
    pub listing: Listing,
    pub band: ProximityBand,
    #[serde(skip)]
    pub distance_miles: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyComps {
    /// Listings within the radius, nearest first.
    pub results: Vec<ProximityResult>,
    pub radius: f64,
    /// City-matched, geocoded listings considered for ranking.
    pub total_in_city: usize,
    /// Listings just outside the radius, within one more mile.
    pub more_in_next_mile: usize,
}

/// Ranks `listings` by distance from `reference` and keeps those within
/// `radius_miles`.
///
/// When `city` is given, only listings whose address city matches it
/// case-insensitively are considered. Listings without a full geocoordinate
/// are skipped. Ordering is ascending by unrounded distance; ties keep their
/// input order.
pub fn rank_by_proximity<I>(
    reference: GeoPoint,
    city: Option<&str>,
    radius_miles: f64,
    listings: I,
    calibration: &DistanceCalibration,
) -> NearbyComps
where
    I: IntoIterator<Item = Listing>,
{
    let wanted_city = city
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_lowercase);

    let mut ranked: Vec<ProximityResult> = listings
        .into_iter()
        .filter(|listing| match &wanted_city {
            Some(wanted) => listing
                .city()
                .is_some_and(|c| c.trim().to_lowercase() == *wanted),
            None => true,
        })
        .filter_map(|mut listing| {
            let point = listing.coordinates()?;
            let distance = calibration.distance_miles(reference, point);
            listing.distance = Some(distance);
            Some(ProximityResult {
                listing,
                band: ProximityBand::classify(distance, radius_miles),
                distance_miles: distance,
            })
        })
        .collect();

    // `sort_by` is stable, so equal distances keep fetch order.
    ranked.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));

    let total_in_city = ranked.len();
    let more_in_next_mile = ranked
        .iter()
        .filter(|r| r.band == ProximityBand::NextMile)
        .count();
    let results = ranked
        .into_iter()
        .filter(|r| r.band == ProximityBand::Within)
        .collect();

    NearbyComps {
        results,
        radius: radius_miles,
        total_in_city,
        more_in_next_mile,
    }
}
