//! Query parameter parsing and validation for `GET /api/wind`.

use std::str::FromStr;

use serde::Deserialize;
use wind_common::{
    parse_request_time, BoundingBox, SourceSelection, WindError, WindRequest, WindResult,
};

use crate::config::ApiLimits;

/// Raw query string, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindQuery {
    pub bbox: Option<String>,
    pub time: Option<String>,
    pub source: Option<String>,
    #[serde(rename = "resolutionKm")]
    pub resolution_km: Option<String>,
    pub format: Option<String>,
}

/// Response body shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// `{metadata, points}`
    #[default]
    Full,
    /// `{meta, pts}` with points as `[lat, lon, u, v]` arrays.
    Compact,
}

impl FromStr for ResponseFormat {
    type Err = WindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(ResponseFormat::Full),
            "compact" => Ok(ResponseFormat::Compact),
            _ => Err(WindError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Full => "full",
            ResponseFormat::Compact => "compact",
        }
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    pub request: WindRequest,
    pub format: ResponseFormat,
}

/// Treat `?time=` the same as no `time` at all.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl WindQuery {
    pub fn validate(&self, limits: &ApiLimits) -> WindResult<ValidatedQuery> {
        let bbox = non_empty(&self.bbox)
            .ok_or_else(|| WindError::MissingParameter("bbox".to_string()))?;
        let bbox = BoundingBox::from_query_string(bbox)?;

        let resolution_km = match non_empty(&self.resolution_km) {
            Some(raw) => parse_resolution(raw, limits)?,
            None => limits.default_resolution_km,
        };

        let mut request = WindRequest::new(bbox, resolution_km);

        if let Some(raw) = non_empty(&self.time) {
            request = request.with_time(parse_request_time(raw)?);
        }
        if let Some(raw) = non_empty(&self.source) {
            request = request.with_source(raw.parse::<SourceSelection>()?);
        }

        let format = match non_empty(&self.format) {
            Some(raw) => raw.parse()?,
            None => ResponseFormat::default(),
        };

        Ok(ValidatedQuery { request, format })
    }
}

fn parse_resolution(raw: &str, limits: &ApiLimits) -> WindResult<f64> {
    let value: f64 = raw
        .parse()
        .map_err(|_| WindError::InvalidResolution(format!("'{}' is not a number", raw)))?;

    if !value.is_finite() || value < limits.min_resolution_km || value > limits.max_resolution_km {
        return Err(WindError::InvalidResolution(format!(
            "must be between {} and {} km, got {}",
            limits.min_resolution_km, limits.max_resolution_km, raw
        )));
    }
    Ok(value)
}
