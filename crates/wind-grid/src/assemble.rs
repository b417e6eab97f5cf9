//! Field assembly: wrap raw points with computed metadata.

use chrono::{DateTime, Utc};
use wind_common::{BoundingBox, WindField, WindFieldMetadata, WindPoint, WindSource};

use crate::grid::grid_dimensions;
use crate::stats::calculate_wind_stats;

/// Build a [`WindField`] whose metadata is derived from `points`.
///
/// Grid dimensions come from [`grid_dimensions`] so they stay deterministic
/// for a given (bbox, resolution) regardless of how many points survived.
pub fn assemble_field(
    source: WindSource,
    time: DateTime<Utc>,
    bbox: BoundingBox,
    resolution_km: f64,
    points: Vec<WindPoint>,
) -> WindField {
    let dims = grid_dimensions(&bbox, resolution_km);
    let stats = calculate_wind_stats(&points);

    let metadata = WindFieldMetadata {
        source,
        time,
        bbox,
        resolution_km,
        grid_width: dims.width,
        grid_height: dims.height,
        min_speed: stats.min_speed,
        max_speed: stats.max_speed,
        mean_speed: stats.mean_speed,
        fetched_at: Utc::now(),
    };

    WindField::new(metadata, points)
}
