//! Comparable-sales aggregation and teardown valuation.
//!
//! The estimate models a spec-home play: buy an existing house for its land
//! at the asking price, demolish, and build something the size of a typical
//! recent new-construction sale, priced at the new-construction average
//! price per square foot.
//!
//! All values are returned unrounded; rounding is a presentation concern for
//! the response layer.

use serde::Serialize;

use crate::listing::Listing;

/// Summary statistics for a comparable-sales set.
///
/// Both averages are `0.0` when no listing qualifies. Callers must read that
/// as "insufficient comp data", not as a meaningful price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CompStats {
    /// Mean of `price / living_area` over listings with both values positive.
    pub avg_price_per_sqft: f64,
    /// Mean living area over listings with a positive living area.
    pub avg_size_sqft: f64,
    pub priced_count: usize,
    pub sized_count: usize,
}

impl CompStats {
    #[must_use]
    pub fn is_sufficient(&self) -> bool {
        self.priced_count > 0 && self.sized_count > 0
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Aggregates a comp set into average price-per-square-foot and average size.
///
/// Listings missing either value, or carrying a non-positive one, are
/// excluded from the statistic that needs it.
#[must_use]
pub fn aggregate(comps: &[Listing]) -> CompStats {
    let (ppsf_sum, priced_count) = comps
        .iter()
        .filter_map(|c| Some(c.positive_price()? / c.positive_living_area()?))
        .fold((0.0, 0usize), |(sum, n), ppsf| (sum + ppsf, n + 1));

    let (size_sum, sized_count) = comps
        .iter()
        .filter_map(Listing::positive_living_area)
        .fold((0.0, 0usize), |(sum, n), area| (sum + area, n + 1));

    CompStats {
        avg_price_per_sqft: mean(ppsf_sum, priced_count),
        avg_size_sqft: mean(size_sum, sized_count),
        priced_count,
        sized_count,
    }
}

/// Land / build / profit estimate for one teardown candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValuationEstimate {
    pub lot_size_sqft: f64,
    /// Subject asking price; `0.0` when the listing has none.
    pub asking_price: f64,
    pub avg_nc_price_per_sqft: f64,
    pub avg_nc_size: f64,
    pub target_build_size: f64,
    pub target_sale_price: f64,
    /// Equal to the asking price: the existing structure is assumed worthless.
    pub estimated_land_cost: f64,
    /// Negative when the rebuild would sell for less than the land costs.
    pub gross_profit_potential: f64,
    pub new_construction_stats: CompStats,
}

impl ValuationEstimate {
    #[must_use]
    pub fn is_profitable(&self) -> bool {
        self.gross_profit_potential > 0.0
    }

    /// `false` when the new-construction comps could not support an estimate.
    #[must_use]
    pub fn has_sufficient_comps(&self) -> bool {
        self.new_construction_stats.is_sufficient()
    }
}

/// Estimates the spec-home opportunity for `subject`.
///
/// Only `new_construction_comps` drive the arithmetic. `_sold_comps` is
/// accepted so callers can hand over both comp sets, but it does not
/// currently influence the result.
#[must_use]
pub fn estimate(
    subject: &Listing,
    _sold_comps: &[Listing],
    new_construction_comps: &[Listing],
) -> ValuationEstimate {
    let nc = aggregate(new_construction_comps);
    let asking_price = subject.price.unwrap_or(0.0);

    let target_build_size = nc.avg_size_sqft;
    let target_sale_price = target_build_size * nc.avg_price_per_sqft;
    let estimated_land_cost = asking_price;

    ValuationEstimate {
        lot_size_sqft: subject.lot_size_sqft(),
        asking_price,
        avg_nc_price_per_sqft: nc.avg_price_per_sqft,
        avg_nc_size: nc.avg_size_sqft,
        target_build_size,
        target_sale_price,
        estimated_land_cost,
        gross_profit_potential: target_sale_price - estimated_land_cost,
        new_construction_stats: nc,
    }
}
