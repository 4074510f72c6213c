pub mod app_config;
pub mod config;
mod error;
mod lenient;
pub mod listing;
pub mod proximity;
pub mod region;
pub mod schools;
pub mod shortlist;
pub mod source;
pub mod valuation;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, load_region_config};
pub use error::{ConfigError, ShortlistError};
pub use listing::{Address, LatLong, Listing, ListingId, LotAreaUnit, SearchPage, SQFT_PER_ACRE};
pub use proximity::{
    rank_by_proximity, DistanceCalibration, GeoPoint, NearbyComps, ProximityBand, ProximityResult,
};
pub use region::{load_region, Bounds, RegionConfig};
pub use schools::{
    extract_school_district, PropertyDetails, PropertySchools, School, SchoolDistrict,
};
pub use shortlist::Shortlist;
pub use source::{
    fetch_all_pages, find_nearby, property_schools, ListingSource, PagePolicy, SearchFilters,
};
pub use valuation::{aggregate, estimate, CompStats, ValuationEstimate};
