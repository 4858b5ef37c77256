use ndarray::{s, Array2};
use serde_derive::{Deserialize, Serialize};

use super::bbox::BoundingBox;

/// Affine transform from pixel (col, row) to geographic coordinates.
///
/// Only axis-aligned grids are supported: the rotation coefficients of the
/// GDAL 6-element form are assumed to be zero. `pixel_height` is negative for
/// north-up rasters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        GeoTransform {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// From the GDAL coefficient order [x0, dx, 0, y0, 0, dy].
    pub fn from_gdal(gt: &[f64; 6]) -> Self {
        GeoTransform::new(gt[0], gt[3], gt[1], gt[5])
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            0.0,
            self.origin_y,
            0.0,
            self.pixel_height,
        ]
    }

    /// Geographic coordinates of the top-left corner of pixel (col, row).
    pub fn pixel_to_coords(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width,
            self.origin_y + row * self.pixel_height,
        )
    }

    /// Fractional pixel position of a geographic point.
    pub fn coords_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin_x) / self.pixel_width,
            (y - self.origin_y) / self.pixel_height,
        )
    }

    /// Transform of a sub-window of a grid carrying this transform.
    pub fn window_transform(&self, window: &PixelWindow) -> GeoTransform {
        let (x, y) = self.pixel_to_coords(window.col_off as f64, window.row_off as f64);
        GeoTransform::new(x, y, self.pixel_width, self.pixel_height)
    }

    /// Transform for a grid decimated by `factor` on both axes. The origin is
    /// unchanged so the geographic bounds of the decimated grid stay
    /// consistent with the dropped trailing rows/columns excluded.
    pub fn scaled(&self, factor: usize) -> GeoTransform {
        GeoTransform::new(
            self.origin_x,
            self.origin_y,
            self.pixel_width * factor as f64,
            self.pixel_height * factor as f64,
        )
    }
}

/// Integral pixel window into a raster. Offsets may be negative when the
/// requested bounds extend past the raster origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub col_off: i64,
    pub row_off: i64,
    pub cols: usize,
    pub rows: usize,
}

impl PixelWindow {
    /// Pixel window covering `bbox` in the raster's native pixel space.
    ///
    /// Offsets and lengths are snapped to whole pixels by rounding to the
    /// nearest integer, neither strictly containing nor strictly contained.
    pub fn from_bounds(bbox: &BoundingBox, transform: &GeoTransform) -> PixelWindow {
        let (col_min, row_min) = transform.coords_to_pixel(bbox.west, bbox.north);
        let (col_max, row_max) = transform.coords_to_pixel(bbox.east, bbox.south);

        let cols = (col_max - col_min).round().max(0.0) as usize;
        let rows = (row_max - row_min).round().max(0.0) as usize;

        PixelWindow {
            col_off: col_min.round() as i64,
            row_off: row_min.round() as i64,
            cols,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }
}

/// A 2-D grid of samples plus the affine transform placing it on the map.
/// Missing cells are NaN.
#[derive(Debug, Clone)]
pub struct GeoGrid {
    pub data: Array2<f64>,
    pub transform: GeoTransform,
}

impl GeoGrid {
    pub fn new(data: Array2<f64>, transform: GeoTransform) -> Self {
        GeoGrid { data, transform }
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Geographic bounds implied by the shape and transform.
    pub fn bounds(&self) -> BoundingBox {
        let (rows, cols) = self.shape();
        let (west, north) = self.transform.pixel_to_coords(0.0, 0.0);
        let (east, south) = self.transform.pixel_to_coords(cols as f64, rows as f64);
        BoundingBox::new(west, east, south, north)
    }

    /// Crop or pad with NaN to `shape`, copying the overlapping top-left
    /// region. This never resamples: sources whose native resolution or
    /// origin differ from the reference will silently misalign, so callers
    /// must guarantee consistent source grids.
    pub fn conform_to(&self, shape: (usize, usize)) -> GeoGrid {
        if self.shape() == shape {
            return self.clone();
        }
        let mut data = Array2::from_elem(shape, f64::NAN);
        let rows = self.data.nrows().min(shape.0);
        let cols = self.data.ncols().min(shape.1);
        data.slice_mut(s![..rows, ..cols])
            .assign(&self.data.slice(s![..rows, ..cols]));
        GeoGrid::new(data, self.transform)
    }

    /// Block-mean decimation by `factor` on both axes.
    ///
    /// Each output cell is the mean of the valid samples in its
    /// `factor x factor` source block; a block with no valid samples is NaN.
    /// Trailing rows/columns that do not fill a complete block are dropped.
    pub fn downsample(&self, factor: usize) -> GeoGrid {
        if factor <= 1 {
            return self.clone();
        }
        let (rows, cols) = self.shape();
        let new_rows = rows / factor;
        let new_cols = cols / factor;

        let mut data = Array2::from_elem((new_rows, new_cols), f64::NAN);
        for i in 0..new_rows {
            for j in 0..new_cols {
                let block = self
                    .data
                    .slice(s![i * factor..(i + 1) * factor, j * factor..(j + 1) * factor]);
                let mut sum = 0.0;
                let mut count = 0usize;
                for &v in block.iter() {
                    if !v.is_nan() {
                        sum += v;
                        count += 1;
                    }
                }
                if count > 0 {
                    data[[i, j]] = sum / count as f64;
                }
            }
        }

        GeoGrid::new(data, self.transform.scaled(factor))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    fn degree_grid() -> GeoTransform {
        // 0.1 degree cells, origin at (-125.0, 49.0), north-up
        GeoTransform::new(-125.0, 49.0, 0.1, -0.1)
    }

    #[test]
    fn gdal_round_trip() {
        let t = degree_grid();
        assert_eq!(GeoTransform::from_gdal(&t.to_gdal()), t);
    }

    #[test]
    fn window_covers_exact_bounds() {
        let t = degree_grid();
        let bbox = BoundingBox::new(-124.0, -123.0, 48.0, 48.5);
        let w = PixelWindow::from_bounds(&bbox, &t);
        assert_eq!(w.col_off, 10);
        assert_eq!(w.row_off, 5);
        assert_eq!(w.cols, 10);
        assert_eq!(w.rows, 5);
    }

    #[test]
    fn window_snaps_fractional_bounds_to_nearest() {
        let t = degree_grid();
        // 0.04 of a pixel past the cell edge rounds back, 0.06 rounds forward
        let bbox = BoundingBox::new(-124.004, -122.994, 48.0, 48.5);
        let w = PixelWindow::from_bounds(&bbox, &t);
        assert_eq!(w.col_off, 10);
        assert_eq!(w.cols, 10);
    }

    #[test]
    fn window_offsets_can_be_negative() {
        let t = degree_grid();
        let bbox = BoundingBox::new(-125.5, -124.5, 48.9, 49.5);
        let w = PixelWindow::from_bounds(&bbox, &t);
        assert_eq!(w.col_off, -5);
        assert_eq!(w.row_off, -5);
        assert_eq!(w.cols, 10);
    }

    #[test]
    fn window_transform_shifts_origin() {
        let t = degree_grid();
        let w = PixelWindow {
            col_off: 10,
            row_off: 5,
            cols: 10,
            rows: 5,
        };
        let wt = t.window_transform(&w);
        assert_relative_eq!(wt.origin_x, -124.0);
        assert_relative_eq!(wt.origin_y, 48.5);
        assert_eq!(wt.pixel_width, t.pixel_width);
    }

    #[test]
    fn conform_pads_with_nan() {
        let grid = GeoGrid::new(array![[1.0, 2.0], [3.0, 4.0]], degree_grid());
        let out = grid.conform_to((3, 3));
        assert_eq!(out.shape(), (3, 3));
        assert_eq!(out.data[[0, 0]], 1.0);
        assert_eq!(out.data[[1, 1]], 4.0);
        assert!(out.data[[2, 2]].is_nan());
        assert!(out.data[[0, 2]].is_nan());
    }

    #[test]
    fn conform_crops_to_smaller_reference() {
        let grid = GeoGrid::new(
            array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]],
            degree_grid(),
        );
        let out = grid.conform_to((2, 2));
        assert_eq!(out.data, array![[1.0, 2.0], [4.0, 5.0]]);
    }

    #[test]
    fn downsample_uniform_grid_keeps_value() {
        let grid = GeoGrid::new(Array2::from_elem((6, 6), 3.5), degree_grid());
        let out = grid.downsample(2);
        assert_eq!(out.shape(), (3, 3));
        assert!(out.data.iter().all(|&v| v == 3.5));
    }

    #[test]
    fn downsample_drops_trailing_cells_and_rescales_transform() {
        let grid = GeoGrid::new(Array2::from_elem((5, 7), 1.0), degree_grid());
        let out = grid.downsample(2);
        assert_eq!(out.shape(), (2, 3));
        assert_relative_eq!(out.transform.pixel_width, 0.2);
        assert_relative_eq!(out.transform.pixel_height, -0.2);
        assert_relative_eq!(out.transform.origin_x, grid.transform.origin_x);
    }

    #[test]
    fn downsample_block_without_valid_samples_is_nan() {
        let mut data = Array2::from_elem((4, 4), 2.0);
        data.slice_mut(s![0..2, 0..2]).fill(f64::NAN);
        data[[0, 2]] = f64::NAN;
        let out = GeoGrid::new(data, degree_grid()).downsample(2);
        assert!(out.data[[0, 0]].is_nan());
        // partially valid block averages the valid samples only
        assert_eq!(out.data[[0, 1]], 2.0);
        assert_eq!(out.data[[1, 1]], 2.0);
    }

    #[test]
    fn bounds_follow_transform_and_shape() {
        let grid = GeoGrid::new(Array2::zeros((10, 20)), degree_grid());
        let b = grid.bounds();
        assert_relative_eq!(b.west, -125.0);
        assert_relative_eq!(b.north, 49.0);
        assert_relative_eq!(b.east, -123.0);
        assert_relative_eq!(b.south, 48.0);
    }
}
