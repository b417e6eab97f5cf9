//! Wind field generators for creating predictable test data.
//!
//! Fields are laid out on a regular lattice with a fixed degree step, row 0
//! at the southern edge, matching what the providers produce.

use chrono::{DateTime, Utc};
use wind_common::{BoundingBox, WindField, WindFieldMetadata, WindPoint, WindSource};

use crate::fixtures::time::reference_time;

/// Kilometres per degree used to report a resolution for degree lattices.
const KM_PER_DEGREE: f64 = 111.0;

/// Creates a field by evaluating `f(lon, lat) -> (u, v)` on a lattice.
///
/// # Arguments
///
/// * `bbox` - Extent of the lattice (corners are always sampled)
/// * `step_deg` - Spacing between nodes on both axes
/// * `source` - Source recorded on every point and in the metadata
/// * `time` - Valid time recorded on every point
/// * `f` - Vector function
pub fn lattice_field(
    bbox: BoundingBox,
    step_deg: f64,
    source: WindSource,
    time: DateTime<Utc>,
    f: impl Fn(f64, f64) -> (f64, f64),
) -> WindField {
    let cols = (bbox.width() / step_deg).round() as usize + 1;
    let rows = (bbox.height() / step_deg).round() as usize + 1;

    let mut points = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        let lat = (bbox.min_lat + row as f64 * step_deg).min(bbox.max_lat);
        for col in 0..cols {
            let lon = (bbox.min_lon + col as f64 * step_deg).min(bbox.max_lon);
            let (u, v) = f(lon, lat);
            points.push(WindPoint::from_components(lat, lon, u, v, time, source));
        }
    }

    field_from_points(bbox, step_deg * KM_PER_DEGREE, cols, rows, source, time, points)
}

/// Creates a field where every node carries the same (u, v).
///
/// Source is GFS and the time is the fixture reference time.
///
/// # Example
///
/// ```
/// use test_utils::{uniform_field, fixtures};
///
/// let field = uniform_field(fixtures::bbox::small(), 0.5, 3.0, 4.0);
/// assert_eq!(field.points.len(), 25);
/// assert!((field.metadata.max_speed - 5.0).abs() < 1e-12);
/// ```
pub fn uniform_field(bbox: BoundingBox, step_deg: f64, u: f64, v: f64) -> WindField {
    lattice_field(bbox, step_deg, WindSource::Gfs, reference_time(), |_, _| (u, v))
}

/// Creates a counter-clockwise vortex around the bbox centre.
///
/// Speed grows linearly with distance from the centre (solid-body rotation),
/// so the centre node is calm.
pub fn vortex_field(bbox: BoundingBox, step_deg: f64, strength: f64) -> WindField {
    let (cx, cy) = bbox.center();
    lattice_field(bbox, step_deg, WindSource::Gfs, reference_time(), move |lon, lat| {
        let dx = lon - cx;
        let dy = lat - cy;
        (-dy * strength, dx * strength)
    })
}

/// Creates a field whose u component increases linearly eastwards and v
/// northwards: `u = lon - min_lon`, `v = lat - min_lat`.
///
/// Bilinear interpolation reproduces this field exactly.
pub fn ramp_field(bbox: BoundingBox, step_deg: f64) -> WindField {
    let (x0, y0) = (bbox.min_lon, bbox.min_lat);
    lattice_field(bbox, step_deg, WindSource::Gfs, reference_time(), move |lon, lat| {
        (lon - x0, lat - y0)
    })
}

/// Wraps arbitrary points as a field, computing min/max/mean speed.
pub fn field_from_points(
    bbox: BoundingBox,
    resolution_km: f64,
    grid_width: usize,
    grid_height: usize,
    source: WindSource,
    time: DateTime<Utc>,
    points: Vec<WindPoint>,
) -> WindField {
    let speeds = points.iter().map(|p| p.speed);
    let min_speed = speeds.clone().fold(f64::INFINITY, f64::min);
    let max_speed = speeds.clone().fold(f64::NEG_INFINITY, f64::max);
    let mean_speed = if points.is_empty() {
        0.0
    } else {
        speeds.sum::<f64>() / points.len() as f64
    };

    let metadata = WindFieldMetadata {
        source,
        time,
        bbox,
        resolution_km,
        grid_width,
        grid_height,
        min_speed: if points.is_empty() { 0.0 } else { min_speed },
        max_speed: if points.is_empty() { 0.0 } else { max_speed },
        mean_speed,
        fetched_at: time,
    };
    WindField::new(metadata, points)
}

/// Creates a field with no points at all.
pub fn empty_field(bbox: BoundingBox, source: WindSource) -> WindField {
    field_from_points(bbox, 25.0, 0, 0, source, reference_time(), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_lattice_covers_corners() {
        let bbox = fixtures::bbox::small();
        let field = uniform_field(bbox, 0.5, 1.0, 0.0);
        assert_eq!(field.points.len(), 25);
        assert_eq!((field.points[0].lon, field.points[0].lat), (0.0, 0.0));
        let last = field.points.last().unwrap();
        assert_eq!((last.lon, last.lat), (2.0, 2.0));
        assert_eq!((field.metadata.grid_width, field.metadata.grid_height), (5, 5));
    }

    #[test]
    fn test_vortex_centre_is_calm() {
        let field = vortex_field(fixtures::bbox::small(), 0.5, 2.0);
        let centre = field
            .points
            .iter()
            .find(|p| p.lon == 1.0 && p.lat == 1.0)
            .unwrap();
        assert_eq!(centre.speed, 0.0);
        assert!(field.metadata.max_speed > 0.0);
    }

    #[test]
    fn test_empty_field() {
        let field = empty_field(fixtures::bbox::small(), WindSource::Gfs);
        assert!(field.points.is_empty());
        assert_eq!(field.metadata.max_speed, 0.0);
    }
}
