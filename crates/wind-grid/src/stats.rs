//! Vector statistics over wind samples.

use serde::Serialize;
use wind_common::{direction_from_components, WindPoint};

/// Summary statistics for a set of wind points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindStats {
    /// Number of finite points that contributed.
    pub count: usize,
    pub min_speed: f64,
    pub max_speed: f64,
    pub mean_speed: f64,
    pub mean_u: f64,
    pub mean_v: f64,
    /// "From" direction of the mean vector.
    pub predominant_direction_deg: f64,
}

impl Default for WindStats {
    fn default() -> Self {
        Self {
            count: 0,
            min_speed: 0.0,
            max_speed: 0.0,
            mean_speed: 0.0,
            mean_u: 0.0,
            mean_v: 0.0,
            predominant_direction_deg: 0.0,
        }
    }
}

/// Min/max/mean speed plus the predominant direction.
///
/// The direction comes from the mean of the u and v components, never from
/// averaging angles, so 350° and 10° average to north rather than south.
/// Non-finite points are skipped; an empty set yields all zeros.
pub fn calculate_wind_stats(points: &[WindPoint]) -> WindStats {
    let mut count = 0usize;
    let mut min_speed = f64::INFINITY;
    let mut max_speed = f64::NEG_INFINITY;
    let mut sum_speed = 0.0;
    let mut sum_u = 0.0;
    let mut sum_v = 0.0;

    for point in points.iter().filter(|p| p.is_finite()) {
        count += 1;
        min_speed = min_speed.min(point.speed);
        max_speed = max_speed.max(point.speed);
        sum_speed += point.speed;
        sum_u += point.u;
        sum_v += point.v;
    }

    if count == 0 {
        return WindStats::default();
    }

    let n = count as f64;
    let mean_u = sum_u / n;
    let mean_v = sum_v / n;

    WindStats {
        count,
        min_speed,
        max_speed,
        mean_speed: sum_speed / n,
        mean_u,
        mean_v,
        predominant_direction_deg: direction_from_components(mean_u, mean_v),
    }
}
