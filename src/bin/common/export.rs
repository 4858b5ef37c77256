use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use ndarray::Array2;
use serde_derive::Serialize;
use strum::IntoEnumIterator;

use sundex::catalog::ClimateVariable;
use sundex::constants::days_in_month;
use sundex::models::bbox::BoundingBox;
use sundex::models::grid::GeoGrid;
use sundex::modules::goodday::config::{GoodDayModelConfig, Thresholds};
use sundex::modules::goodday::models::GoodDaysOutput;
use sundex::raster::MonthlyData;

use super::helpers::SundexError;

/// Summary of the valid cells of a layer.
#[derive(Debug, Serialize)]
struct GridStats {
    min: f64,
    max: f64,
    mean: f64,
}

fn grid_stats(data: &Array2<f64>) -> Option<GridStats> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut count = 0usize;
    for &v in data.iter() {
        if v.is_nan() {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
        sum += v;
        count += 1;
    }
    (count > 0).then(|| GridStats {
        min,
        max,
        mean: sum / count as f64,
    })
}

/// Grid values as nested rows, NaN as null, rounded to three decimals to
/// keep the export compact.
fn to_rows(data: &Array2<f64>) -> Vec<Vec<Option<f64>>> {
    data.rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .map(|&v| {
                    if v.is_nan() {
                        None
                    } else {
                        Some((v * 1000.0).round() / 1000.0)
                    }
                })
                .collect()
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct Shape {
    rows: usize,
    cols: usize,
}

#[derive(Debug, Serialize)]
struct MonthEntry {
    month: u32,
    days: u32,
}

#[derive(Debug, Serialize)]
struct Layer {
    values: Vec<Vec<Option<f64>>>,
    stats: Option<GridStats>,
}

impl Layer {
    fn from_grid(grid: &GeoGrid) -> Self {
        Layer {
            values: to_rows(&grid.data),
            stats: grid_stats(&grid.data),
        }
    }
}

/// The whole contract exposed to rendering/export consumers: opaque numeric
/// grids plus one shared geospatial transform.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Export<'a> {
    bounds: BoundingBox,
    shape: Shape,
    cell_size: f64,
    transform: [f64; 6],
    months: Vec<MonthEntry>,
    total_days: f64,
    thresholds: &'a Thresholds,
    model_version: &'a str,
    good_days: Layer,
    good_days_solar: Layer,
    good_days_dry: Layer,
    #[serde(skip_serializing_if = "Option::is_none")]
    good_days_temp: Option<Layer>,
    /// seasonal mean of each raw climate variable over the period
    averages: BTreeMap<String, Layer>,
}

/// Write the JSON export, optionally block-mean downsampled by `factor`.
pub fn write_export(
    path: &Path,
    data: &MonthlyData,
    result: &GoodDaysOutput,
    months: &[u32],
    thresholds: &Thresholds,
    config: &GoodDayModelConfig,
    factor: Option<usize>,
) -> Result<(), SundexError> {
    let factor = factor.unwrap_or(1).max(1);
    let decimate = |data: &Array2<f64>| -> GeoGrid {
        GeoGrid::new(data.clone(), result.transform).downsample(factor)
    };

    let combined = decimate(&result.combined);
    let bounds = combined.bounds();
    let (rows, cols) = combined.shape();
    let transform = combined.transform.to_gdal();

    let mut averages = BTreeMap::new();
    for variable in ClimateVariable::iter() {
        if let Some(mean) = data.seasonal_mean(variable, months) {
            averages.insert(variable.to_string(), Layer::from_grid(&decimate(&mean)));
        }
    }

    let export = Export {
        bounds,
        shape: Shape { rows, cols },
        cell_size: combined.transform.pixel_width.abs(),
        transform,
        months: months
            .iter()
            .map(|&month| MonthEntry {
                month,
                days: days_in_month(month),
            })
            .collect(),
        total_days: result.total_days,
        thresholds,
        model_version: &config.model_version,
        good_days: Layer::from_grid(&combined),
        good_days_solar: Layer::from_grid(&decimate(&result.solar)),
        good_days_dry: Layer::from_grid(&decimate(&result.dry)),
        good_days_temp: result
            .temperature
            .as_ref()
            .map(|t| Layer::from_grid(&decimate(t))),
        averages,
    };

    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), &export)?;
    Ok(())
}
