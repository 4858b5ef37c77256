use std::path::{Path, PathBuf};

use gdal::raster::Buffer;
use gdal::Dataset;
use log::debug;
use ndarray::{s, Array2};
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::catalog::{Catalog, ClimateVariable};
use crate::constants::NODATA_DEFAULT;
use crate::models::bbox::BoundingBox;
use crate::models::grid::{GeoGrid, GeoTransform, PixelWindow};

use super::MonthlyData;

/// Failure to read a raster that the catalog resolved. A file that exists
/// but cannot be opened or read indicates corruption, not absence, so these
/// are fatal for the load operation.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("gdal: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
    #[error("raster {path} does not intersect the requested bounds")]
    OutsideBounds { path: PathBuf },
    #[error("raster buffer shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Read the window of band 1 of `path` that intersects `bbox`.
///
/// Only the windowed region is read, never the full raster. Samples equal to
/// the declared nodata value (or -9999 when the file declares none) become
/// NaN; the comparison is exact, with no tolerance for floating-point nodata
/// encodings. Cells of the window outside the raster extent are NaN.
///
/// With `reference_shape` the result is conformed (cropped or NaN-padded) to
/// that shape; the affine transform of the window itself is returned either
/// way so the first load of a run can establish the reference.
pub fn load_window(
    path: &Path,
    bbox: &BoundingBox,
    reference_shape: Option<(usize, usize)>,
) -> Result<GeoGrid, RasterError> {
    let dataset = Dataset::open(path)?;
    let band = dataset.rasterband(1)?;
    let native = GeoTransform::from_gdal(&dataset.geo_transform()?);
    let (raster_cols, raster_rows) = dataset.raster_size();

    let window = PixelWindow::from_bounds(bbox, &native);
    if window.is_empty() {
        return Err(RasterError::OutsideBounds {
            path: path.to_path_buf(),
        });
    }

    let mut data = Array2::from_elem((window.rows, window.cols), f64::NAN);

    // intersect the window with the raster extent; the rest stays NaN
    let col_min = window.col_off.max(0);
    let row_min = window.row_off.max(0);
    let col_max = (window.col_off + window.cols as i64).min(raster_cols as i64);
    let row_max = (window.row_off + window.rows as i64).min(raster_rows as i64);

    if col_max <= col_min || row_max <= row_min {
        return Err(RasterError::OutsideBounds {
            path: path.to_path_buf(),
        });
    }

    let read_cols = (col_max - col_min) as usize;
    let read_rows = (row_max - row_min) as usize;

    let buffer: Buffer<f64> = band.read_as(
        (col_min as isize, row_min as isize),
        (read_cols, read_rows),
        (read_cols, read_rows),
        None,
    )?;
    let read = Array2::from_shape_vec((read_rows, read_cols), buffer.data().to_vec())?;

    let r0 = (row_min - window.row_off) as usize;
    let c0 = (col_min - window.col_off) as usize;
    data.slice_mut(s![r0..r0 + read_rows, c0..c0 + read_cols])
        .assign(&read);

    let nodata = band.no_data_value().unwrap_or(NODATA_DEFAULT);
    data.mapv_inplace(|v| if v == nodata { f64::NAN } else { v });

    let grid = GeoGrid::new(data, native.window_transform(&window));
    Ok(match reference_shape {
        Some(shape) => grid.conform_to(shape),
        None => grid,
    })
}

/// Load every catalogued grid for `months`, clipped to `bbox`.
///
/// Variables are visited in declaration order and months ascending, so the
/// reference grid established by the first successful load is stable across
/// runs. Catalog gaps are skipped silently; a resolved file that fails to
/// read aborts the whole load.
pub fn load_monthly(
    catalog: &Catalog,
    bbox: &BoundingBox,
    months: &[u32],
) -> Result<MonthlyData, RasterError> {
    let mut wanted: Vec<u32> = months.to_vec();
    wanted.sort_unstable();
    wanted.dedup();

    let mut data = MonthlyData::new();
    for variable in ClimateVariable::iter() {
        for &month in &wanted {
            let Some(path) = catalog.get(variable, month) else {
                continue;
            };
            debug!("loading {variable} month {month:02} from {}", path.display());
            let grid = load_window(path, bbox, data.shape())?;
            data.insert(variable, month, grid);
        }
    }
    Ok(data)
}
