//! Wind vector points and fields.
//!
//! All vectors use the meteorological convention: `u` is the eastward and `v`
//! the northward component in m/s, and the direction is where the wind comes
//! FROM, in degrees clockwise from north.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;

/// Origin of a wind field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindSource {
    /// DWD ICON global model
    Icon,
    /// NOAA GFS via the forecast JSON API
    Gfs,
    /// ECMWF ERA5 reanalysis
    Era5,
    /// NOAA GFS 0.25° via the NOMADS OPeNDAP server
    Nomads,
    /// Synthetic fallback field
    Mock,
}

impl WindSource {
    /// Every real provider, in default priority order.
    pub const PROVIDERS: [WindSource; 4] = [
        WindSource::Icon,
        WindSource::Gfs,
        WindSource::Era5,
        WindSource::Nomads,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WindSource::Icon => "icon",
            WindSource::Gfs => "gfs",
            WindSource::Era5 => "era5",
            WindSource::Nomads => "nomads",
            WindSource::Mock => "mock",
        }
    }

    /// Whether this source is backed by a real provider adapter.
    pub fn is_provider(&self) -> bool {
        !matches!(self, WindSource::Mock)
    }
}

impl fmt::Display for WindSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "icon" => Ok(WindSource::Icon),
            "gfs" => Ok(WindSource::Gfs),
            "era5" => Ok(WindSource::Era5),
            "nomads" => Ok(WindSource::Nomads),
            "mock" => Ok(WindSource::Mock),
            other => Err(other.to_string()),
        }
    }
}

/// Meteorological direction (degrees the wind blows FROM) for a (u, v) pair.
///
/// Returns a value in `[0, 360)`. A calm vector maps to 0.
pub fn direction_from_components(u: f64, v: f64) -> f64 {
    if u == 0.0 && v == 0.0 {
        return 0.0;
    }
    let deg = (-u).atan2(-v).to_degrees();
    let deg = (deg + 360.0) % 360.0;
    // -0.0 % 360 and rounding just below 360 both need folding back
    if deg >= 360.0 {
        0.0
    } else {
        deg.abs()
    }
}

/// A single wind sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindPoint {
    pub lat: f64,
    pub lon: f64,
    /// Eastward component (m/s)
    pub u: f64,
    /// Northward component (m/s)
    pub v: f64,
    /// Always `sqrt(u² + v²)`
    pub speed: f64,
    /// Direction the wind comes from (degrees, 0 = north)
    pub direction_deg: f64,
    pub time: DateTime<Utc>,
    pub source: WindSource,
}

impl WindPoint {
    /// Build a point from vector components.
    pub fn from_components(
        lat: f64,
        lon: f64,
        u: f64,
        v: f64,
        time: DateTime<Utc>,
        source: WindSource,
    ) -> Self {
        Self {
            lat,
            lon,
            u,
            v,
            speed: (u * u + v * v).sqrt(),
            direction_deg: direction_from_components(u, v),
            time,
            source,
        }
    }

    /// Build a point from a provider-native (speed, direction) pair.
    ///
    /// `u = -speed·sin(dir)`, `v = -speed·cos(dir)`. The stored speed is
    /// recomputed from the components so the magnitude invariant holds exactly.
    pub fn from_speed_direction(
        lat: f64,
        lon: f64,
        speed: f64,
        direction_deg: f64,
        time: DateTime<Utc>,
        source: WindSource,
    ) -> Self {
        let rad = direction_deg.to_radians();
        let u = -speed * rad.sin();
        let v = -speed * rad.cos();
        Self::from_components(lat, lon, u, v, time, source)
    }

    /// Whether every numeric component is finite.
    pub fn is_finite(&self) -> bool {
        [self.lat, self.lon, self.u, self.v, self.speed, self.direction_deg]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Descriptive metadata for a wind field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindFieldMetadata {
    pub source: WindSource,
    pub time: DateTime<Utc>,
    pub bbox: BoundingBox,
    pub resolution_km: f64,
    pub grid_width: usize,
    pub grid_height: usize,
    pub min_speed: f64,
    pub max_speed: f64,
    pub mean_speed: f64,
    pub fetched_at: DateTime<Utc>,
}

/// A set of wind samples plus metadata for one time and region.
///
/// Built once per fetch or fallback and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindField {
    pub metadata: WindFieldMetadata,
    pub points: Vec<WindPoint>,
}

impl WindField {
    pub fn new(metadata: WindFieldMetadata, points: Vec<WindPoint>) -> Self {
        Self { metadata, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn source(&self) -> WindSource {
        self.metadata.source
    }
}
