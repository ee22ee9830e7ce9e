//! Growth curves
//!
//! Each curve maps a projection year to a multiplier on the baseline,
//! with `factor(0) == 1` for every pattern.

use super::{GrowthPattern, GrowthSettings};

/// Logistic slope over the normalised projection window
const S_CURVE_STEEPNESS: f64 = 10.0;

/// Multiplier applied to the baseline in `year` (0 = baseline)
pub fn growth_factor(settings: &GrowthSettings, year: u32) -> f64 {
    if year == 0 {
        return 1.0;
    }
    let rate = settings.annual_growth_rate / 100.0;

    let factor = match settings.pattern {
        GrowthPattern::Linear => 1.0 + rate * year as f64,
        GrowthPattern::Exponential => (1.0 + rate).powi(year as i32),
        GrowthPattern::SCurve => s_curve(rate, year, settings.projection_years),
        GrowthPattern::Custom => (1..=year)
            .map(|y| 1.0 + rate_for_year(settings, y) / 100.0)
            .product(),
    };

    factor.max(0.0)
}

/// Percentage rate used for `year` under the custom pattern: the rate of
/// the latest configured year at or before `year`, else the annual rate
pub fn rate_for_year(settings: &GrowthSettings, year: u32) -> f64 {
    settings
        .custom_rates
        .range(..=year)
        .next_back()
        .map(|(_, rate)| *rate)
        .unwrap_or(settings.annual_growth_rate)
}

/// Logistic curve rescaled to run from 1 at year 0 to the exponential
/// ceiling `(1 + rate)^horizon` at the final year
fn s_curve(rate: f64, year: u32, horizon: u32) -> f64 {
    if horizon == 0 {
        return 1.0;
    }
    let ceiling = (1.0 + rate).powi(horizon as i32);
    let logistic = |t: f64| 1.0 / (1.0 + (-S_CURVE_STEEPNESS * (t - 0.5)).exp());

    let start = logistic(0.0);
    let end = logistic(1.0);
    let t = (year.min(horizon) as f64) / horizon as f64;
    let progress = (logistic(t) - start) / (end - start);

    1.0 + (ceiling - 1.0) * progress
}
