use std::f64::consts::SQRT_2;

use super::constants::{DRY_CEILING, TEMP_FLOOR, TEMP_STD};

/// Standard normal CDF via the error function.
pub fn norm_cdf(z: f64) -> f64 {
    0.5 * (1.0 + libm::erf(z / SQRT_2))
}

/// Probability that a single day's solar transmittance meets `solar_min`,
/// modelling daily transmittance as Normal(monthly mean, solar_std) to
/// capture day-to-day variability in cloud cover.
pub fn solar_fraction(soltrans: f64, solar_min: f64, solar_std: f64) -> f64 {
    1.0 - norm_cdf((solar_min - soltrans) / solar_std)
}

/// Dry-day fraction of a month from its precipitation total [mm].
///
/// Not a calibrated distribution: a monotonic heuristic in the average daily
/// precipitation, clipped to [floor, 0.95]. More monthly rain means fewer
/// dry days, asymptotically bounded below by the preset floor.
pub fn dry_fraction(monthly_precip: f64, days_in_month: f64, divisor: f64, floor: f64) -> f64 {
    let daily_precip = monthly_precip / days_in_month;
    (DRY_CEILING - daily_precip / divisor).clamp(floor, DRY_CEILING)
}

/// Probability that a single day is warm enough, Normal(monthly mean,
/// TEMP_STD), floored at TEMP_FLOOR so very cold months still model the
/// occasional warm spell.
pub fn warm_fraction(tmean: f64, temp_min: f64) -> f64 {
    (1.0 - norm_cdf((temp_min - tmean) / TEMP_STD)).clamp(TEMP_FLOOR, 1.0)
}
