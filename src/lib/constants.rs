/// Nodata sentinel assumed when a raster file does not declare one.
pub const NODATA_DEFAULT: f64 = -9999.0;

/// Days per calendar month, normal-year convention (February is fixed at 28,
/// never leap-adjusted).
pub const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// October through April, the default evaluation period.
pub const DEFAULT_SEASON: [u32; 7] = [10, 11, 12, 1, 2, 3, 4];

/// Day count for a calendar month (1-12).
///
/// Months are validated at the API edges; an out-of-range month here is a
/// programming error and panics.
pub fn days_in_month(month: u32) -> u32 {
    DAYS_IN_MONTH[(month - 1) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn february_is_never_leap_adjusted() {
        assert_eq!(days_in_month(2), 28);
    }

    #[test]
    fn default_season_totals_212_days() {
        let total: u32 = DEFAULT_SEASON.iter().map(|&m| days_in_month(m)).sum();
        assert_eq!(total, 212);
    }
}
