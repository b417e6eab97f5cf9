//! Cache key normalization.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use wind_common::{round_to_hour, BoundingBox, SourceSelection, WindRequest};

/// A normalized cache key.
///
/// Keeps the normalized parameters alongside the key string so a miss can
/// fetch exactly the area and hour the entry will stand for.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKey {
    pub source: SourceSelection,
    /// Bounding box snapped outward to the cache grid.
    pub bbox: BoundingBox,
    /// Request time rounded down to the hour.
    pub time: DateTime<Utc>,
    /// Resolution rounded to 0.1 km, as it appears in the key.
    pub resolution_km: f64,
    key: String,
}

impl CacheKey {
    /// Build the key for a request.
    ///
    /// Two requests whose boxes snap to the same cells, whose times fall in
    /// the same hour and whose resolutions agree to 0.1 km get identical keys.
    pub fn new(
        source: SourceSelection,
        bbox: &BoundingBox,
        time: DateTime<Utc>,
        resolution_km: f64,
        snap_grid_deg: f64,
    ) -> Self {
        let bbox = bbox.snap(snap_grid_deg);
        let time = round_to_hour(time);
        let resolution_km = round_resolution(resolution_km);
        let key = format!(
            "{}|{}|{}|{:.1}",
            source.as_str(),
            bbox.cache_key(),
            time.to_rfc3339_opts(SecondsFormat::Secs, true),
            resolution_km
        );

        Self {
            source,
            bbox,
            time,
            resolution_km,
            key,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The request a miss should fetch: snapped box at the rounded hour.
    pub fn to_request(&self) -> WindRequest {
        WindRequest::new(self.bbox, self.resolution_km)
            .with_time(self.time)
            .with_source(self.source)
    }
}

fn round_resolution(resolution_km: f64) -> f64 {
    (resolution_km * 10.0).round() / 10.0
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}
