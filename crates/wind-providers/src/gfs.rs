//! NOAA GFS adapter backed by an Open-Meteo compatible forecast API.
//!
//! The API answers point queries, so the request box is turned into a lattice
//! with [`generate_grid`] and queried in bulk, up to [`BATCH_SIZE`] locations
//! per call. Responses carry hourly speed and direction; the hour matching
//! the request is picked and converted to u/v.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};
use wind_common::{round_to_hour, WindField, WindPoint, WindRequest, WindSource};
use wind_grid::{assemble_field, coarsen_resolution, generate_grid, GridNode};

use crate::config::ProviderSettings;
use crate::coverage::{Coverage, TimeWindow};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::WindProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Locations per bulk request.
pub const BATCH_SIZE: usize = 100;

/// Hour format used by the API for `start_hour`/`end_hour` and in responses.
const HOUR_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub struct GfsProvider {
    client: Client,
    base_url: String,
    enabled: bool,
    max_points: usize,
}

impl GfsProvider {
    pub fn new(settings: &ProviderSettings, max_points: usize) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(settings.timeout_or(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url_or(DEFAULT_BASE_URL).trim_end_matches('/').to_string(),
            enabled: settings.enabled,
            max_points,
        })
    }

    async fn fetch_batch(
        &self,
        nodes: &[GridNode],
        hour: DateTime<Utc>,
        source_time: DateTime<Utc>,
    ) -> ProviderResult<Vec<WindPoint>> {
        let url = batch_url(&self.base_url, nodes, hour);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited(format!(
                "HTTP 429: {}",
                error_reason(&body).unwrap_or_else(|| "too many requests".to_string())
            )));
        }
        if !status.is_success() {
            return Err(ProviderError::FetchFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_reason(&body).unwrap_or_else(|| status.to_string())
            )));
        }

        parse_forecast(&body, nodes, hour, source_time)
    }
}

#[async_trait]
impl WindProvider for GfsProvider {
    fn id(&self) -> WindSource {
        WindSource::Gfs
    }

    fn name(&self) -> &str {
        "NOAA GFS (Open-Meteo)"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn coverage(&self) -> Coverage {
        Coverage::global(TimeWindow::rolling_hours(6, 384))
    }

    #[instrument(skip(self, request), fields(provider = "gfs", bbox = ?request.bbox))]
    async fn fetch_wind_field(&self, request: &WindRequest) -> ProviderResult<WindField> {
        let started = Instant::now();
        let time = request.effective_time();
        let hour = round_to_hour(time);
        let resolution_km = coarsen_resolution(&request.bbox, request.resolution_km, self.max_points);
        let nodes = generate_grid(&request.bbox, resolution_km);

        let mut points = Vec::with_capacity(nodes.len());
        for batch in nodes.chunks(BATCH_SIZE) {
            points.extend(self.fetch_batch(batch, hour, time).await?);
        }

        debug!(
            nodes = nodes.len(),
            points = points.len(),
            resolution_km = resolution_km,
            latency_ms = started.elapsed().as_millis() as u64,
            "GFS fetch complete"
        );

        Ok(assemble_field(
            WindSource::Gfs,
            time,
            request.bbox,
            resolution_km,
            points,
        ))
    }
}

/// Bulk query URL for a batch of lattice nodes at one hour.
pub fn batch_url(base_url: &str, nodes: &[GridNode], hour: DateTime<Utc>) -> String {
    let join = |f: fn(&GridNode) -> f64| {
        nodes
            .iter()
            .map(|n| format!("{:.4}", f(n)))
            .collect::<Vec<_>>()
            .join(",")
    };
    let hour = hour.format(HOUR_FORMAT);

    format!(
        "{}?latitude={}&longitude={}&hourly=wind_speed_10m,wind_direction_10m&wind_speed_unit=ms&timezone=GMT&start_hour={}&end_hour={}",
        base_url,
        join(|n| n.lat),
        join(|n| n.lon),
        hour,
        hour
    )
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ForecastBody {
    Many(Vec<LocationForecast>),
    One(LocationForecast),
}

#[derive(Debug, Deserialize)]
struct LocationForecast {
    hourly: Option<HourlySeries>,
}

#[derive(Debug, Deserialize)]
struct HourlySeries {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_direction_10m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

fn error_reason(body: &str) -> Option<String> {
    serde_json::from_str::<ApiError>(body)
        .ok()
        .filter(|e| e.error)
        .and_then(|e| e.reason)
}

/// Turn a bulk response into points placed on the requested nodes.
///
/// Locations are matched by position, since the API snaps coordinates to its
/// own grid. Locations whose series lacks the wanted hour, or whose values
/// for it are missing, are skipped.
pub fn parse_forecast(
    body: &str,
    nodes: &[GridNode],
    hour: DateTime<Utc>,
    time: DateTime<Utc>,
) -> ProviderResult<Vec<WindPoint>> {
    if let Some(reason) = error_reason(body) {
        return Err(ProviderError::FetchFailed(reason));
    }

    let locations = match serde_json::from_str::<ForecastBody>(body)? {
        ForecastBody::Many(list) => list,
        ForecastBody::One(single) => vec![single],
    };
    if locations.len() != nodes.len() {
        return Err(ProviderError::Parse(format!(
            "expected {} locations, got {}",
            nodes.len(),
            locations.len()
        )));
    }

    let wanted = hour.format(HOUR_FORMAT).to_string();
    let mut points = Vec::with_capacity(nodes.len());

    for (node, location) in nodes.iter().zip(locations) {
        let Some(series) = location.hourly else {
            continue;
        };
        // A series without the wanted hour contributes nothing
        let Some(idx) = series.time.iter().position(|t| *t == wanted) else {
            continue;
        };
        let speed = series.wind_speed_10m.get(idx).copied().flatten();
        let direction = series.wind_direction_10m.get(idx).copied().flatten();

        if let (Some(speed), Some(direction)) = (speed, direction) {
            if speed.is_finite() && direction.is_finite() {
                points.push(WindPoint::from_speed_direction(
                    node.lat,
                    node.lon,
                    speed,
                    direction,
                    time,
                    WindSource::Gfs,
                ));
            }
        }
    }

    Ok(points)
}
