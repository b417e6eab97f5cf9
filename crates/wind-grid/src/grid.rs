//! Regular lat/lon lattice construction.

use serde::Serialize;
use wind_common::BoundingBox;

/// Kilometres per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.0;

/// Tolerance added to spans so a node landing exactly on the max edge is kept.
const EDGE_EPSILON: f64 = 1e-9;

/// Floor for `cos(avgLat)` so polar boxes do not produce infinite steps.
const MIN_COS_LAT: f64 = 0.01;

/// Upper bound on coarsening rounds in [`coarsen_resolution`].
const MAX_COARSEN_ROUNDS: usize = 64;

/// A lattice sample position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridNode {
    pub lon: f64,
    pub lat: f64,
    pub col: usize,
    pub row: usize,
}

/// Number of lattice columns and rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridDimensions {
    pub width: usize,
    pub height: usize,
}

impl GridDimensions {
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Angular spacing for a given box and resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSteps {
    pub lon_step: f64,
    pub lat_step: f64,
}

/// Degree steps for `resolution_km` at the box's mean latitude.
///
/// `lat_step = res / 111`, `lon_step = res / (111 · cos(avgLat))`.
pub fn grid_steps(bbox: &BoundingBox, resolution_km: f64) -> GridSteps {
    let avg_lat = (bbox.min_lat + bbox.max_lat) / 2.0;
    let cos_lat = avg_lat.to_radians().cos().max(MIN_COS_LAT);
    GridSteps {
        lon_step: resolution_km / (KM_PER_DEGREE * cos_lat),
        lat_step: resolution_km / KM_PER_DEGREE,
    }
}

/// Width and height of the lattice `generate_grid` would produce.
///
/// Computed from the spans directly rather than by walking the lattice.
/// Floating point rounding at the max edge can make the two differ by one.
pub fn grid_dimensions(bbox: &BoundingBox, resolution_km: f64) -> GridDimensions {
    if !(resolution_km > 0.0) || !resolution_km.is_finite() {
        return GridDimensions { width: 1, height: 1 };
    }

    let avg_lat = (bbox.min_lat + bbox.max_lat) / 2.0;
    let lon_deg_per_km = 1.0 / (KM_PER_DEGREE * avg_lat.to_radians().cos().max(MIN_COS_LAT));
    let lat_deg_per_km = 1.0 / KM_PER_DEGREE;

    let width = ((bbox.width() + EDGE_EPSILON) / (resolution_km * lon_deg_per_km)).floor() as usize + 1;
    let height = ((bbox.height() + EDGE_EPSILON) / (resolution_km * lat_deg_per_km)).floor() as usize + 1;

    GridDimensions { width, height }
}

/// Sample positions spaced `resolution_km` apart, starting at the SW corner.
///
/// Row-major, south to north, west to east. Always yields at least one node
/// for a valid box.
pub fn generate_grid(bbox: &BoundingBox, resolution_km: f64) -> Vec<GridNode> {
    if !(resolution_km > 0.0) || !resolution_km.is_finite() {
        return vec![GridNode {
            lon: bbox.min_lon,
            lat: bbox.min_lat,
            col: 0,
            row: 0,
        }];
    }

    let steps = grid_steps(bbox, resolution_km);
    let mut nodes = Vec::new();

    let mut row = 0;
    loop {
        let lat = bbox.min_lat + row as f64 * steps.lat_step;
        if lat > bbox.max_lat + EDGE_EPSILON {
            break;
        }

        let mut col = 0;
        loop {
            let lon = bbox.min_lon + col as f64 * steps.lon_step;
            if lon > bbox.max_lon + EDGE_EPSILON {
                break;
            }
            nodes.push(GridNode {
                lon: lon.min(bbox.max_lon),
                lat: lat.min(bbox.max_lat),
                col,
                row,
            });
            col += 1;
        }
        row += 1;
    }

    nodes
}

/// Smallest resolution (≥ the requested one) whose lattice fits in `max_points`.
pub fn coarsen_resolution(bbox: &BoundingBox, resolution_km: f64, max_points: usize) -> f64 {
    if max_points == 0 {
        return resolution_km;
    }

    let mut resolution = resolution_km;
    for _ in 0..MAX_COARSEN_ROUNDS {
        let points = grid_dimensions(bbox, resolution).len();
        if points <= max_points {
            return resolution;
        }
        // Points scale with 1/res², so jump most of the way then creep up
        let ratio = (points as f64 / max_points as f64).sqrt();
        resolution *= ratio.max(1.05);
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_widen_with_latitude() {
        let equator = grid_steps(&BoundingBox::new(0.0, -1.0, 1.0, 1.0), 111.0);
        let north = grid_steps(&BoundingBox::new(0.0, 59.0, 1.0, 61.0), 111.0);

        assert!((equator.lat_step - 1.0).abs() < 1e-12);
        assert!((equator.lon_step - 1.0).abs() < 1e-9);
        // cos(60°) = 0.5, so longitude steps double
        assert!((north.lon_step - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_single_node_for_tiny_box() {
        let bbox = BoundingBox::new(80.0, 7.0, 80.01, 7.01);
        let nodes = generate_grid(&bbox, 25.0);
        assert_eq!(nodes.len(), 1);
        assert_eq!(grid_dimensions(&bbox, 25.0), GridDimensions { width: 1, height: 1 });
    }

    #[test]
    fn test_nodes_stay_inside_bbox() {
        let bbox = BoundingBox::new(79.5, 5.9, 82.0, 10.0);
        for node in generate_grid(&bbox, 25.0) {
            assert!(bbox.contains_point(node.lon, node.lat));
        }
    }

    #[test]
    fn test_coarsen_respects_cap() {
        let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
        let res = coarsen_resolution(&bbox, 5.0, 2_500);
        assert!(res > 5.0);
        assert!(grid_dimensions(&bbox, res).len() <= 2_500);
    }

    #[test]
    fn test_coarsen_noop_when_small() {
        let bbox = BoundingBox::new(79.5, 5.9, 82.0, 10.0);
        assert_eq!(coarsen_resolution(&bbox, 25.0, 2_500), 25.0);
    }
}
