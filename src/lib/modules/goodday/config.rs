use serde_derive::{Deserialize, Serialize};

use super::constants::*;

/// Caller-supplied criteria for a good day.
///
/// The estimator performs no validation: a zero `precip_max` combined with a
/// threshold-scaled dry divisor yields non-finite results, so callers must
/// enforce `precip_max > 0` before invoking the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// minimum solar transmittance [0-1]
    pub solar_min: f64,
    /// maximum daily precipitation [mm]
    pub precip_max: f64,
    /// minimum temperature [°C]
    pub temp_min: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            solar_min: 0.40,
            precip_max: 2.5,
            temp_min: -5.0,
        }
    }
}

/// Denominator of the dry-day heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DryDivisor {
    /// Fixed mm/day scale, independent of the precip_max threshold.
    Fixed(f64),
    /// Multiple of the precip_max threshold.
    ScaledByThreshold(f64),
}

impl DryDivisor {
    pub fn resolve(&self, precip_max: f64) -> f64 {
        match self {
            DryDivisor::Fixed(divisor) => *divisor,
            DryDivisor::ScaledByThreshold(scale) => scale * precip_max,
        }
    }
}

/// configuration structure for model config
/// stores the calibration constants of one estimator variant
///
/// The presets are equally valid calibrations, not refinements of one
/// canonical model; pick one and keep it fixed for comparable outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodDayModelConfig {
    pub model_version: String,
    /// day-to-day standard deviation of solar transmittance
    pub solar_std: f64,
    pub dry_divisor: DryDivisor,
    /// lower bound of the dry-day fraction
    pub dry_floor: f64,
    /// whether the temperature criterion participates in the combination
    pub use_temperature: bool,
}

impl GoodDayModelConfig {
    pub fn new(model_version_str: &str) -> Self {
        match model_version_str {
            "sundex-v2" => GoodDayModelConfig {
                model_version: model_version_str.to_owned(),
                solar_std: SUNDEX_V2_SOLAR_STD,
                dry_divisor: DryDivisor::Fixed(SUNDEX_V2_DRY_DIVISOR),
                dry_floor: SUNDEX_V2_DRY_FLOOR,
                use_temperature: true,
            },
            "webapp-v2" => GoodDayModelConfig {
                model_version: model_version_str.to_owned(),
                solar_std: WEBAPP_V2_SOLAR_STD,
                dry_divisor: DryDivisor::ScaledByThreshold(WEBAPP_V2_DRY_SCALE),
                dry_floor: WEBAPP_V2_DRY_FLOOR,
                use_temperature: false,
            },
            _ => GoodDayModelConfig {
                model_version: "interactive".to_owned(),
                solar_std: INTERACTIVE_SOLAR_STD,
                dry_divisor: DryDivisor::ScaledByThreshold(INTERACTIVE_DRY_SCALE),
                dry_floor: INTERACTIVE_DRY_FLOOR,
                use_temperature: true,
            },
        }
    }
}

impl Default for GoodDayModelConfig {
    fn default() -> Self {
        GoodDayModelConfig::new("interactive")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_version_falls_back_to_interactive() {
        let config = GoodDayModelConfig::new("no-such-preset");
        assert_eq!(config, GoodDayModelConfig::default());
        assert_eq!(config.model_version, "interactive");
    }

    #[test]
    fn webapp_preset_drops_the_temperature_criterion() {
        assert!(!GoodDayModelConfig::new("webapp-v2").use_temperature);
        assert!(GoodDayModelConfig::new("sundex-v2").use_temperature);
    }

    #[test]
    fn dry_divisor_resolution() {
        assert_eq!(DryDivisor::Fixed(15.0).resolve(2.5), 15.0);
        assert_eq!(DryDivisor::ScaledByThreshold(6.0).resolve(2.5), 15.0);
    }
}
