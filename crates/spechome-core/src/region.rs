//! Search region: map bounds, per-city bounds, and distance calibration.
//!
//! The built-in region covers the Oak Brook, IL western suburbs. A YAML file
//! with the same shape can replace it (see [`load_region`]).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::proximity::DistanceCalibration;
use crate::ConfigError;

/// Map viewport in degrees, as the upstream search URL expects it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    const fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Two-letter state code, e.g. `"IL"`.
    pub state: String,
    pub default_city: String,
    pub bounds: Bounds,
    /// Tighter bounds for individual cities, keyed by lowercase city name.
    #[serde(default)]
    pub cities: BTreeMap<String, Bounds>,
    #[serde(default)]
    pub distance: DistanceCalibration,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self::oak_brook()
    }
}

impl RegionConfig {
    /// Oak Brook and surrounding western suburbs.
    #[must_use]
    pub fn oak_brook() -> Self {
        let cities = [
            ("downers grove", Bounds::new(41.83, 41.74, -87.94, -88.09)),
            ("oak brook", Bounds::new(41.87, 41.81, -87.90, -87.98)),
            ("hinsdale", Bounds::new(41.82, 41.78, -87.90, -87.96)),
            ("westmont", Bounds::new(41.81, 41.77, -87.94, -88.00)),
            ("clarendon hills", Bounds::new(41.81, 41.78, -87.93, -87.97)),
        ]
        .into_iter()
        .map(|(name, bounds)| (name.to_owned(), bounds))
        .collect();

        Self {
            state: "IL".to_owned(),
            default_city: "Oak Brook".to_owned(),
            bounds: Bounds::new(41.92, 41.72, -87.80, -88.15),
            cities,
            distance: DistanceCalibration::default(),
        }
    }

    /// Bounds for `city` when it is a known city, otherwise the region bounds.
    #[must_use]
    pub fn bounds_for(&self, city: Option<&str>) -> Bounds {
        city.and_then(|c| self.cities.get(&c.trim().to_lowercase()))
            .copied()
            .unwrap_or(self.bounds)
    }

    /// URL path slug for a city search, e.g. `"downers-grove-il"`.
    #[must_use]
    pub fn slug_for(&self, city: &str) -> String {
        let city_slug = city
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        format!("{city_slug}-{}", self.state.to_lowercase())
    }

    /// Human search term, e.g. `"Hinsdale, IL"`.
    #[must_use]
    pub fn search_term(&self, city: &str) -> String {
        format!("{}, {}", city.trim(), self.state)
    }
}

/// Load and validate a region definition from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_region(path: &Path) -> Result<RegionConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RegionFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_region(&content)
}

fn parse_region(content: &str) -> Result<RegionConfig, ConfigError> {
    let mut region: RegionConfig = serde_yaml::from_str(content)?;
    region.cities = std::mem::take(&mut region.cities)
        .into_iter()
        .map(|(name, bounds)| (name.trim().to_lowercase(), bounds))
        .collect();
    validate_region(&region)?;
    Ok(region)
}

fn validate_bounds(label: &str, bounds: &Bounds) -> Result<(), ConfigError> {
    let edges = [bounds.north, bounds.south, bounds.east, bounds.west];
    if !edges.iter().all(|v| v.is_finite()) {
        return Err(ConfigError::Validation(format!(
            "{label}: every edge must be a finite coordinate"
        )));
    }
    if bounds.north <= bounds.south {
        return Err(ConfigError::Validation(format!(
            "{label}: north ({}) must be greater than south ({})",
            bounds.north, bounds.south
        )));
    }
    if bounds.east <= bounds.west {
        return Err(ConfigError::Validation(format!(
            "{label}: east ({}) must be greater than west ({})",
            bounds.east, bounds.west
        )));
    }
    Ok(())
}

fn validate_region(region: &RegionConfig) -> Result<(), ConfigError> {
    if region.state.trim().is_empty() {
        return Err(ConfigError::Validation("state must be non-empty".to_string()));
    }
    if region.default_city.trim().is_empty() {
        return Err(ConfigError::Validation(
            "default_city must be non-empty".to_string(),
        ));
    }
    validate_bounds("region bounds", &region.bounds)?;
    for (city, bounds) in &region.cities {
        validate_bounds(&format!("city '{city}'"), bounds)?;
    }
    let d = &region.distance;
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(d.miles_per_degree_lat) || !usable(d.miles_per_degree_lng) {
        return Err(ConfigError::Validation(
            "distance calibration constants must be positive and finite".to_string(),
        ));
    }
    Ok(())
}
