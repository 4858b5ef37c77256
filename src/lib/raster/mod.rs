pub mod cache;
#[cfg(feature = "gdal")]
pub mod reader;

use std::collections::{BTreeMap, HashMap};

use ndarray::{Array2, Zip};

use crate::catalog::ClimateVariable;
use crate::models::grid::{GeoGrid, GeoTransform};

/// Elementwise mean across a stack of equally shaped grids, ignoring NaN.
/// A cell that is NaN in every input stays NaN. None for an empty stack.
pub fn nanmean_stack(grids: &[&Array2<f64>]) -> Option<Array2<f64>> {
    let first = grids.first()?;
    let mut sum = Array2::<f64>::zeros(first.dim());
    let mut count = Array2::<f64>::zeros(first.dim());

    for grid in grids {
        Zip::from(&mut sum)
            .and(&mut count)
            .and(*grid)
            .for_each(|s, n, &v| {
                if !v.is_nan() {
                    *s += v;
                    *n += 1.0;
                }
            });
    }

    Some(
        Zip::from(&sum)
            .and(&count)
            .map_collect(|&s, &n| if n > 0.0 { s / n } else { f64::NAN }),
    )
}

/// Aligned monthly grids for the catalogued climate variables.
///
/// The first grid inserted establishes the reference transform and shape for
/// the whole container; every later grid is conformed (cropped or NaN-padded)
/// to that reference, and the transform is never re-derived from a later
/// file. Callers must therefore insert in a stable order.
#[derive(Debug, Clone, Default)]
pub struct MonthlyData {
    grids: HashMap<ClimateVariable, BTreeMap<u32, Array2<f64>>>,
    reference: Option<(GeoTransform, (usize, usize))>,
}

impl MonthlyData {
    pub fn new() -> Self {
        MonthlyData::default()
    }

    /// Insert a loaded grid, conforming it to the reference shape if one is
    /// already established.
    pub fn insert(&mut self, variable: ClimateVariable, month: u32, grid: GeoGrid) {
        let data = match &self.reference {
            None => {
                self.reference = Some((grid.transform, grid.shape()));
                grid.data
            }
            Some((_, shape)) => grid.conform_to(*shape).data,
        };
        self.grids.entry(variable).or_default().insert(month, data);
    }

    pub fn get(&self, variable: ClimateVariable, month: u32) -> Option<&Array2<f64>> {
        self.grids.get(&variable).and_then(|months| months.get(&month))
    }

    /// Reference transform, established by the first successful load.
    pub fn transform(&self) -> Option<&GeoTransform> {
        self.reference.as_ref().map(|(transform, _)| transform)
    }

    /// Reference shape (rows, cols).
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.reference.as_ref().map(|(_, shape)| *shape)
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_none()
    }

    /// NaN-mean of one variable across `months`; months without data are
    /// skipped. None when the variable has no data at all in the period.
    pub fn seasonal_mean(&self, variable: ClimateVariable, months: &[u32]) -> Option<Array2<f64>> {
        let stack: Vec<&Array2<f64>> = months
            .iter()
            .filter_map(|&month| self.get(variable, month))
            .collect();
        nanmean_stack(&stack)
    }
}
