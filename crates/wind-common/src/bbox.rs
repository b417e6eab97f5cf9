//! Geographic bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees.
///
/// Serialized as the ordered array `[minLon, minLat, maxLon, maxLat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates without validation.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Create a bounding box, checking ranges and ordering.
    pub fn try_new(
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    ) -> Result<Self, BboxParseError> {
        let bbox = Self::new(min_lon, min_lat, max_lon, max_lat);
        bbox.validate()?;
        Ok(bbox)
    }

    /// Parse a query string parameter: "minLon,minLat,maxLon,maxLat".
    pub fn from_query_string(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))?;
        }

        Self::try_new(values[0], values[1], values[2], values[3])
    }

    /// Check coordinate ranges and min < max on both axes.
    pub fn validate(&self) -> Result<(), BboxParseError> {
        let all = [self.min_lon, self.min_lat, self.max_lon, self.max_lat];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(BboxParseError::NonFinite);
        }
        if !(-180.0..=180.0).contains(&self.min_lon) || !(-180.0..=180.0).contains(&self.max_lon) {
            return Err(BboxParseError::OutOfRange(format!(
                "longitude must be within [-180, 180], got {} to {}",
                self.min_lon, self.max_lon
            )));
        }
        if !(-90.0..=90.0).contains(&self.min_lat) || !(-90.0..=90.0).contains(&self.max_lat) {
            return Err(BboxParseError::OutOfRange(format!(
                "latitude must be within [-90, 90], got {} to {}",
                self.min_lat, self.max_lat
            )));
        }
        if self.min_lon >= self.max_lon || self.min_lat >= self.max_lat {
            return Err(BboxParseError::Inverted);
        }
        Ok(())
    }

    /// Width of the bounding box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height of the bounding box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Center point as (lon, lat).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lon < other.max_lon
            && self.max_lon > other.min_lon
            && self.min_lat < other.max_lat
            && self.max_lat > other.min_lat
    }

    /// Compute the intersection of two bounding boxes.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }

        Some(BoundingBox {
            min_lon: self.min_lon.max(other.min_lon),
            min_lat: self.min_lat.max(other.min_lat),
            max_lon: self.max_lon.min(other.max_lon),
            max_lat: self.max_lat.min(other.max_lat),
        })
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Check if a point lies strictly inside this bbox.
    pub fn contains_point_strict(&self, lon: f64, lat: f64) -> bool {
        lon > self.min_lon && lon < self.max_lon && lat > self.min_lat && lat < self.max_lat
    }

    /// Check if another bbox lies entirely inside this one.
    pub fn contains_bbox(&self, other: &BoundingBox) -> bool {
        self.contains_point(other.min_lon, other.min_lat)
            && self.contains_point(other.max_lon, other.max_lat)
    }

    /// Expand outward to multiples of `grid_size` degrees.
    ///
    /// Mins are floored and maxes ceiled, then clamped to the valid coordinate
    /// ranges, so every bbox inside the same snap cell maps to the same result.
    pub fn snap(&self, grid_size: f64) -> BoundingBox {
        if !(grid_size > 0.0) {
            return *self;
        }
        let floor = |v: f64| (v / grid_size).floor() * grid_size;
        let ceil = |v: f64| (v / grid_size).ceil() * grid_size;

        BoundingBox {
            min_lon: floor(self.min_lon).max(-180.0),
            min_lat: floor(self.min_lat).max(-90.0),
            max_lon: ceil(self.max_lon).min(180.0),
            max_lat: ceil(self.max_lat).min(90.0),
        }
    }

    /// Generate a cache key fragment (quantized to avoid floating point noise).
    pub fn cache_key(&self) -> String {
        format!(
            "{:.4}_{:.4}_{:.4}_{:.4}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.min_lon, b.min_lat, b.max_lon, b.max_lat]
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bbox format: {0}. Expected 'minLon,minLat,maxLon,maxLat'")]
    InvalidFormat(String),

    #[error("Invalid number in bbox: {0}")]
    InvalidNumber(String),

    #[error("Bbox coordinates must be finite")]
    NonFinite,

    #[error("Bbox out of range: {0}")]
    OutOfRange(String),

    #[error("Bbox minimums must be less than maximums")]
    Inverted,
}
