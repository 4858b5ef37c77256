use ndarray::{Array2, Zip};

use crate::catalog::ClimateVariable;
use crate::constants::days_in_month;
use crate::models::grid::GeoTransform;
use crate::raster::MonthlyData;

use super::config::{GoodDayModelConfig, Thresholds};
use super::functions::{dry_fraction, solar_fraction, warm_fraction};

/// Expected good-day counts accumulated over the evaluated period.
///
/// Cells with no contributing month in any grid are NaN: "no data", which is
/// distinct from a true zero probability. `total_days` counts every month of
/// the period, with or without data.
#[derive(Debug, Clone)]
pub struct GoodDaysOutput {
    /// days meeting all criteria at once
    pub combined: Array2<f64>,
    /// days meeting the solar criterion alone
    pub solar: Array2<f64>,
    /// days meeting the dryness criterion alone
    pub dry: Array2<f64>,
    /// days meeting the temperature criterion alone; None when the preset
    /// drops the criterion
    pub temperature: Option<Array2<f64>>,
    pub total_days: f64,
    pub transform: GeoTransform,
}

/// Estimate expected good-weather days per cell from monthly climate
/// normals.
///
/// Pure and stateless: identical inputs always yield identical outputs, so
/// it is safe to recompute on every threshold or month-set change. Inputs
/// are never mutated. A month missing any required variable contributes
/// nothing to any accumulator (skipped, not zeroed); the same holds per cell
/// for NaN samples. None when the container holds no grids at all.
pub fn estimate_good_days(
    data: &MonthlyData,
    months: &[u32],
    thresholds: &Thresholds,
    config: &GoodDayModelConfig,
) -> Option<GoodDaysOutput> {
    let shape = data.shape()?;
    let transform = *data.transform()?;

    let mut combined = Array2::<f64>::zeros(shape);
    let mut solar = Array2::<f64>::zeros(shape);
    let mut dry = Array2::<f64>::zeros(shape);
    let mut temperature = config
        .use_temperature
        .then(|| Array2::<f64>::zeros(shape));
    // months contributing per cell, to tell "no data" apart from zero
    let mut contributions = Array2::<f64>::zeros(shape);

    let mut total_days = 0.0;
    for &month in months {
        let days = days_in_month(month) as f64;
        total_days += days;

        let Some(soltrans) = data.get(ClimateVariable::Soltrans, month) else {
            continue;
        };
        let Some(ppt) = data.get(ClimateVariable::Ppt, month) else {
            continue;
        };
        let tmean = if config.use_temperature {
            match data.get(ClimateVariable::Tmean, month) {
                Some(tmean) => Some(tmean),
                None => continue,
            }
        } else {
            None
        };

        let divisor = config.dry_divisor.resolve(thresholds.precip_max);

        let frac_solar = soltrans.mapv(|s| solar_fraction(s, thresholds.solar_min, config.solar_std));
        let frac_dry = ppt.mapv(|p| dry_fraction(p, days, divisor, config.dry_floor));
        let frac_warm = tmean.map(|t| t.mapv(|v| warm_fraction(v, thresholds.temp_min)));

        // a cell missing any required variable is skipped for this month
        let mut valid = Zip::from(&frac_solar)
            .and(&frac_dry)
            .map_collect(|&s, &d| !s.is_nan() && !d.is_nan());
        if let Some(frac_warm) = &frac_warm {
            Zip::from(&mut valid)
                .and(frac_warm)
                .for_each(|v, &w| *v = *v && !w.is_nan());
        }

        Zip::from(&mut contributions)
            .and(&valid)
            .for_each(|c, &v| {
                if v {
                    *c += 1.0;
                }
            });
        Zip::from(&mut solar)
            .and(&frac_solar)
            .and(&valid)
            .par_for_each(|acc, &f, &v| {
                if v {
                    *acc += f * days;
                }
            });
        Zip::from(&mut dry)
            .and(&frac_dry)
            .and(&valid)
            .par_for_each(|acc, &f, &v| {
                if v {
                    *acc += f * days;
                }
            });

        match (&mut temperature, &frac_warm) {
            (Some(temperature), Some(frac_warm)) => {
                Zip::from(&mut *temperature)
                    .and(frac_warm)
                    .and(&valid)
                    .par_for_each(|acc, &f, &v| {
                        if v {
                            *acc += f * days;
                        }
                    });
                Zip::from(&mut combined)
                    .and(&frac_solar)
                    .and(&frac_dry)
                    .and(frac_warm)
                    .and(&valid)
                    .par_for_each(|acc, &s, &d, &w, &v| {
                        if v {
                            // independence across the three criteria
                            *acc += s * d * w * days;
                        }
                    });
            }
            _ => {
                Zip::from(&mut combined)
                    .and(&frac_solar)
                    .and(&frac_dry)
                    .and(&valid)
                    .par_for_each(|acc, &s, &d, &v| {
                        if v {
                            *acc += s * d * days;
                        }
                    });
            }
        }
    }

    // cells that never contributed are no-data, not zero
    for grid in [Some(&mut combined), Some(&mut solar), Some(&mut dry), temperature.as_mut()]
        .into_iter()
        .flatten()
    {
        Zip::from(grid).and(&contributions).for_each(|g, &n| {
            if n == 0.0 {
                *g = f64::NAN;
            }
        });
    }

    Some(GoodDaysOutput {
        combined,
        solar,
        dry,
        temperature,
        total_days,
        transform,
    })
}
