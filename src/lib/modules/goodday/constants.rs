// Daily temperature variation around the monthly mean [°C]
pub const TEMP_STD: f64 = 5.0;
// Keeps at least a 10% chance of a warm spell even in very cold months
pub const TEMP_FLOOR: f64 = 0.1;

// Dry-day fraction of a month with no precipitation at all
pub const DRY_CEILING: f64 = 0.95;

// CALIBRATION PRESETS
// sundex-v2: absolute dry divisor in mm/day, temperature criterion on
pub const SUNDEX_V2_SOLAR_STD: f64 = 0.12;
pub const SUNDEX_V2_DRY_DIVISOR: f64 = 15.0;
pub const SUNDEX_V2_DRY_FLOOR: f64 = 0.15;

// interactive: dry divisor scales with the precip_max threshold
pub const INTERACTIVE_SOLAR_STD: f64 = 0.12;
pub const INTERACTIVE_DRY_SCALE: f64 = 6.0;
pub const INTERACTIVE_DRY_FLOOR: f64 = 0.10;

// webapp-v2: tighter solar spread, no temperature criterion
pub const WEBAPP_V2_SOLAR_STD: f64 = 0.10;
pub const WEBAPP_V2_DRY_SCALE: f64 = 8.0;
pub const WEBAPP_V2_DRY_FLOOR: f64 = 0.05;
