//! Wind field request types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::WindError;
use crate::field::WindSource;

/// Which provider(s) a request may be served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSelection {
    /// Walk the provider priority list.
    Auto,
    /// Only the named provider, falling back to synthetic data.
    Provider(WindSource),
}

impl SourceSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceSelection::Auto => "auto",
            SourceSelection::Provider(source) => source.as_str(),
        }
    }
}

impl Default for SourceSelection {
    fn default() -> Self {
        SourceSelection::Auto
    }
}

impl fmt::Display for SourceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceSelection {
    type Err = WindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(SourceSelection::Auto);
        }
        match s.parse::<WindSource>() {
            Ok(source) if source.is_provider() => Ok(SourceSelection::Provider(source)),
            _ => Err(WindError::UnsupportedSource(s.to_string())),
        }
    }
}

/// A structurally valid request for a wind field.
#[derive(Debug, Clone, PartialEq)]
pub struct WindRequest {
    pub bbox: BoundingBox,
    /// Requested valid time; `None` means "now".
    pub time: Option<DateTime<Utc>>,
    pub resolution_km: f64,
    pub source: SourceSelection,
}

impl WindRequest {
    pub fn new(bbox: BoundingBox, resolution_km: f64) -> Self {
        Self {
            bbox,
            time: None,
            resolution_km,
            source: SourceSelection::Auto,
        }
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_source(mut self, source: SourceSelection) -> Self {
        self.source = source;
        self
    }

    /// Requested time, or the current time when none was supplied.
    pub fn effective_time(&self) -> DateTime<Utc> {
        self.time.unwrap_or_else(Utc::now)
    }
}
