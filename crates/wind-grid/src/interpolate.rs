//! Bilinear interpolation over regular grids.

use wind_common::{BoundingBox, WindField};

/// Relative tolerance used when collapsing lattice coordinates.
const COORD_TOLERANCE: f64 = 1e-7;

/// A row-major scalar grid, row 0 at the southern edge.
///
/// Missing cells are stored as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl ScalarGrid {
    /// Wrap `values` as a `width × height` grid. `None` if the length is wrong.
    pub fn new(width: usize, height: usize, values: Vec<f64>) -> Option<Self> {
        if values.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            values,
        })
    }

    /// Grid filled with `NaN` (every cell missing).
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![f64::NAN; width * height],
        }
    }

    /// Build a grid by evaluating `f(col, row)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                values.push(f(col, row));
            }
        }
        Self {
            width,
            height,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell value, `None` when out of range or missing.
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let value = self.values[row * self.width + col];
        value.is_finite().then_some(value)
    }

    pub fn set(&mut self, col: usize, row: usize, value: f64) {
        if col < self.width && row < self.height {
            self.values[row * self.width + col] = value;
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Interpolate `grid` at `(lon, lat)`, where the grid's corner cells sit on
/// the corners of `bbox`.
///
/// Returns `None` outside the box, for grids with fewer than two columns or
/// rows, and when any of the four enclosing corners is missing.
pub fn bilinear_interpolate(
    lon: f64,
    lat: f64,
    grid: &ScalarGrid,
    bbox: &BoundingBox,
) -> Option<f64> {
    if grid.width < 2 || grid.height < 2 {
        return None;
    }
    if !lon.is_finite() || !lat.is_finite() || !bbox.contains_point(lon, lat) {
        return None;
    }

    let span_x = bbox.width();
    let span_y = bbox.height();
    if span_x <= 0.0 || span_y <= 0.0 {
        return None;
    }

    let fx = (lon - bbox.min_lon) / span_x * (grid.width - 1) as f64;
    let fy = (lat - bbox.min_lat) / span_y * (grid.height - 1) as f64;

    let x0 = (fx.floor() as usize).min(grid.width - 2);
    let y0 = (fy.floor() as usize).min(grid.height - 2);
    let tx = fx - x0 as f64;
    let ty = fy - y0 as f64;

    let q00 = grid.get(x0, y0)?;
    let q10 = grid.get(x0 + 1, y0)?;
    let q01 = grid.get(x0, y0 + 1)?;
    let q11 = grid.get(x0 + 1, y0 + 1)?;

    let south = q00 * (1.0 - tx) + q10 * tx;
    let north = q01 * (1.0 - tx) + q11 * tx;
    Some(south * (1.0 - ty) + north * ty)
}

/// (u, v) lookup built from a wind field's lattice.
#[derive(Debug, Clone)]
pub struct VectorGrid {
    extent: BoundingBox,
    u: ScalarGrid,
    v: ScalarGrid,
}

impl VectorGrid {
    /// Index the field's points onto the lattice they were sampled on.
    ///
    /// The lattice is recovered from the distinct longitudes and latitudes in
    /// the field; cells with no point are left missing. Returns `None` when
    /// the points do not span at least 2 × 2 distinct positions.
    pub fn from_field(field: &WindField) -> Option<Self> {
        let lons = distinct_sorted(field.points.iter().map(|p| p.lon));
        let lats = distinct_sorted(field.points.iter().map(|p| p.lat));
        if lons.len() < 2 || lats.len() < 2 {
            return None;
        }

        let extent = BoundingBox::new(lons[0], lats[0], lons[lons.len() - 1], lats[lats.len() - 1]);
        let mut u = ScalarGrid::empty(lons.len(), lats.len());
        let mut v = ScalarGrid::empty(lons.len(), lats.len());

        for point in field.points.iter().filter(|p| p.is_finite()) {
            if let (Some(col), Some(row)) = (nearest_index(&lons, point.lon), nearest_index(&lats, point.lat)) {
                u.set(col, row, point.u);
                v.set(col, row, point.v);
            }
        }

        Some(Self { extent, u, v })
    }

    /// Geographic extent covered by the lattice.
    pub fn extent(&self) -> &BoundingBox {
        &self.extent
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.u.width(), self.u.height())
    }

    /// Interpolated (u, v) at a position, `None` outside the lattice or in a
    /// cell touching missing data.
    pub fn sample(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let u = bilinear_interpolate(lon, lat, &self.u, &self.extent)?;
        let v = bilinear_interpolate(lon, lat, &self.v, &self.extent)?;
        Some((u, v))
    }
}

fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut all: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    all.sort_by(f64::total_cmp);
    all.dedup_by(|a, b| same_coord(*a, *b));
    all
}

fn same_coord(a: f64, b: f64) -> bool {
    (a - b).abs() <= COORD_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

fn nearest_index(sorted: &[f64], value: f64) -> Option<usize> {
    let idx = sorted.partition_point(|c| *c < value);
    [idx.checked_sub(1), Some(idx)]
        .into_iter()
        .flatten()
        .filter(|&i| i < sorted.len())
        .find(|&i| same_coord(sorted[i], value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> ScalarGrid {
        // value = col + 10·row
        ScalarGrid::from_fn(3, 3, |col, row| col as f64 + 10.0 * row as f64)
    }

    #[test]
    fn test_corners_return_stored_values() {
        let grid = ramp();
        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        assert_eq!(bilinear_interpolate(0.0, 0.0, &grid, &bbox), Some(0.0));
        assert_eq!(bilinear_interpolate(2.0, 0.0, &grid, &bbox), Some(2.0));
        assert_eq!(bilinear_interpolate(0.0, 2.0, &grid, &bbox), Some(20.0));
        assert_eq!(bilinear_interpolate(2.0, 2.0, &grid, &bbox), Some(22.0));
        assert_eq!(bilinear_interpolate(1.0, 1.0, &grid, &bbox), Some(11.0));
    }

    #[test]
    fn test_midpoint_blend() {
        let grid = ramp();
        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let value = bilinear_interpolate(0.5, 0.5, &grid, &bbox).unwrap();
        assert!((value - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_outside_bbox_is_none() {
        let grid = ramp();
        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        assert_eq!(bilinear_interpolate(2.5, 1.0, &grid, &bbox), None);
        assert_eq!(bilinear_interpolate(1.0, -0.1, &grid, &bbox), None);
    }

    #[test]
    fn test_degenerate_grid_is_none() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let single = ScalarGrid::new(1, 1, vec![4.0]).unwrap();
        let row = ScalarGrid::new(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(bilinear_interpolate(0.5, 0.5, &single, &bbox), None);
        assert_eq!(bilinear_interpolate(0.5, 0.5, &row, &bbox), None);
    }

    #[test]
    fn test_missing_corner_is_none() {
        let mut grid = ramp();
        grid.set(1, 1, f64::NAN);
        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        assert_eq!(bilinear_interpolate(0.5, 0.5, &grid, &bbox), None);
        // Every cell of a 3×3 grid shares the centre node
        assert!(bilinear_interpolate(0.0, 0.0, &grid, &bbox).is_none());
        assert!(bilinear_interpolate(1.9, 1.9, &grid, &bbox).is_none());
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(ScalarGrid::new(2, 2, vec![1.0, 2.0, 3.0]).is_none());
    }
}
