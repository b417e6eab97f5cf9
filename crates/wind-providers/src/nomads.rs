//! NOAA NOMADS adapter reading GFS 0.25° through OPeNDAP.
//!
//! The DODS server slices the global grid by index, so no GRIB decoding is
//! needed: `ugrd10m` and `vgrd10m` are requested as ASCII for the index box
//! covering the request and paired up point by point.
//!
//! The newest cycle is not always on the server when its nominal publish delay
//! has passed, so earlier cycles are tried in turn, going back a day.
//!
//! Grid indices: latitude `(lat + 90) / 0.25` (south to north), longitude
//! `lon / 0.25` over 0..360, time `forecast_hour / 3`.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use wind_common::{BoundingBox, WindField, WindPoint, WindRequest, WindSource};
use wind_grid::{assemble_field, coarsen_resolution, KM_PER_DEGREE};

use crate::config::ProviderSettings;
use crate::coverage::{Coverage, TimeWindow};
use crate::dods::{parse_dods_ascii, DodsGrid};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::WindProvider;

pub const DEFAULT_BASE_URL: &str = "https://nomads.ncep.noaa.gov/dods/gfs_0p25";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Native grid spacing in degrees.
const GRID_DEG: f64 = 0.25;
const MAX_LAT_INDEX: usize = 720;
const MAX_LON_INDEX: usize = 1439;

/// Hours after a cycle's nominal time before it appears on the server.
const PUBLISH_DELAY_HOURS: i64 = 5;

/// Cycles tried, newest first, before giving up.
const CYCLE_ATTEMPTS: i64 = 4;
const CYCLE_HOURS: i64 = 6;

/// Body fragments GrADS servers send for a dataset that does not exist.
const MISSING_DATASET_MARKERS: [&str; 2] = ["is not an available dataset", "no such file"];

/// Values at or above this are GrADS fill values.
const FILL_THRESHOLD: f64 = 1e10;

pub struct NomadsProvider {
    client: Client,
    base_url: String,
    enabled: bool,
    max_points: usize,
}

impl NomadsProvider {
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

    /// One variable's slab, or `None` when the cycle is not on the server.
    async fn fetch_component(&self, url: &str) -> ProviderResult<Option<DodsGrid>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited("HTTP 429 from NOMADS".to_string()));
        }

        let body = response.text().await?;
        if is_missing_cycle(status, &body) {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProviderError::FetchFailed(format!(
                "NOMADS returned HTTP {}",
                status.as_u16()
            )));
        }

        parse_dods_ascii(&body).map(Some)
    }

    /// Both components from one cycle, or `None` when it is not published.
    async fn fetch_cycle(
        &self,
        cycle: DateTime<Utc>,
        time: DateTime<Utc>,
        bbox: &BoundingBox,
        step: usize,
    ) -> ProviderResult<Option<(DodsGrid, DodsGrid)>> {
        let time_idx = time_index(cycle, time);
        let u_url = component_url(&self.base_url, "ugrd10m", cycle, time_idx, bbox, step);
        debug!(url = %u_url, "Fetching NOMADS u component");

        let Some(u) = self.fetch_component(&u_url).await? else {
            return Ok(None);
        };
        let v_url = component_url(&self.base_url, "vgrd10m", cycle, time_idx, bbox, step);
        let Some(v) = self.fetch_component(&v_url).await? else {
            return Ok(None);
        };
        Ok(Some((u, v)))
    }
}

/// A 404, or an error body naming a dataset that does not exist.
pub fn is_missing_cycle(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::NOT_FOUND {
        return true;
    }
    let lower = body.trim_start().to_lowercase();
    lower.starts_with("error {")
        || MISSING_DATASET_MARKERS.iter().any(|m| lower.contains(m))
}

/// Whether a box crosses 0° longitude, which splits the 0..360 index range.
pub fn spans_prime_meridian(bbox: &BoundingBox) -> bool {
    bbox.min_lon < 0.0 && bbox.max_lon >= 0.0
}

/// Most recent cycle expected to be published at `now`.
pub fn latest_cycle(now: DateTime<Utc>) -> DateTime<Utc> {
    let available = now - Duration::hours(PUBLISH_DELAY_HOURS);
    let hour = available.hour() / 6 * 6;
    available
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or(available)
}

/// Cycles to try at `now`, newest first, covering the previous 24 hours.
pub fn candidate_cycles(now: DateTime<Utc>) -> impl Iterator<Item = DateTime<Utc>> {
    let latest = latest_cycle(now);
    (0..CYCLE_ATTEMPTS).map(move |i| latest - Duration::hours(i * CYCLE_HOURS))
}

/// Index into the 3-hourly time axis for `time` within `cycle`.
pub fn time_index(cycle: DateTime<Utc>, time: DateTime<Utc>) -> i64 {
    let forecast_hour = (time - cycle).num_hours().max(0);
    forecast_hour / 3
}

pub fn lat_to_index(lat: f64) -> usize {
    (((lat + 90.0) / GRID_DEG).floor().max(0.0) as usize).min(MAX_LAT_INDEX)
}

pub fn lon_to_index(lon: f64) -> usize {
    let lon = if lon < 0.0 { lon + 360.0 } else { lon };
    ((lon / GRID_DEG).floor().max(0.0) as usize).min(MAX_LON_INDEX)
}

/// Index stride for a resolution in kilometres.
pub fn index_step(resolution_km: f64) -> usize {
    let degrees = resolution_km / KM_PER_DEGREE;
    ((degrees / GRID_DEG).round() as usize).max(1)
}

/// DODS ASCII URL for one variable over the box.
pub fn component_url(
    base_url: &str,
    variable: &str,
    cycle: DateTime<Utc>,
    time_idx: i64,
    bbox: &BoundingBox,
    step: usize,
) -> String {
    format!(
        "{}/gfs{}/gfs_0p25_{:02}z.ascii?{}[{}][{}:{}:{}][{}:{}:{}]",
        base_url,
        cycle.format("%Y%m%d"),
        cycle.hour(),
        variable,
        time_idx,
        lat_to_index(bbox.min_lat),
        step,
        lat_to_index(bbox.max_lat),
        lon_to_index(bbox.min_lon),
        step,
        lon_to_index(bbox.max_lon),
    )
}

/// Pair u and v slabs into points inside `bbox`, dropping fill values.
pub fn combine_components(
    u: &DodsGrid,
    v: &DodsGrid,
    bbox: &BoundingBox,
    time: DateTime<Utc>,
) -> ProviderResult<Vec<WindPoint>> {
    if u.lats.len() != v.lats.len() || u.lons.len() != v.lons.len() {
        return Err(ProviderError::Parse(
            "u and v slabs have different shapes".to_string(),
        ));
    }

    let mut points = Vec::new();
    for (row, &lat) in u.lats.iter().enumerate() {
        for (col, &raw_lon) in u.lons.iter().enumerate() {
            let lon = if raw_lon > 180.0 { raw_lon - 360.0 } else { raw_lon };
            if !bbox.contains_point(lon, lat) {
                continue;
            }
            let (Some(uu), Some(vv)) = (u.get(row, col), v.get(row, col)) else {
                continue;
            };
            if !uu.is_finite() || !vv.is_finite() || uu.abs() >= FILL_THRESHOLD || vv.abs() >= FILL_THRESHOLD {
                continue;
            }
            points.push(WindPoint::from_components(lat, lon, uu, vv, time, WindSource::Nomads));
        }
    }
    Ok(points)
}

#[async_trait]
impl WindProvider for NomadsProvider {
    fn id(&self) -> WindSource {
        WindSource::Nomads
    }

    fn name(&self) -> &str {
        "NOAA NOMADS GFS 0.25° (OPeNDAP)"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn coverage(&self) -> Coverage {
        Coverage::global(TimeWindow::rolling_hours(6, 240))
    }

    fn can_serve(&self, request: &WindRequest) -> bool {
        self.is_enabled()
            && !spans_prime_meridian(&request.bbox)
            && self.coverage().covers(&request.bbox, request.time, Utc::now())
    }

    #[instrument(skip(self, request), fields(provider = "nomads", bbox = ?request.bbox))]
    async fn fetch_wind_field(&self, request: &WindRequest) -> ProviderResult<WindField> {
        if spans_prime_meridian(&request.bbox) {
            return Err(ProviderError::Unavailable(
                "bbox crosses the prime meridian".to_string(),
            ));
        }

        let started = Instant::now();
        let time = request.effective_time();
        let resolution_km = coarsen_resolution(&request.bbox, request.resolution_km, self.max_points);
        let step = index_step(resolution_km);

        let mut found = None;
        for cycle in candidate_cycles(Utc::now()) {
            match self.fetch_cycle(cycle, time, &request.bbox, step).await? {
                Some(slabs) => {
                    found = Some((cycle, slabs));
                    break;
                }
                None => debug!(cycle = %cycle, "NOMADS cycle not published, trying the previous one"),
            }
        }
        let Some((cycle, (u, v))) = found else {
            return Err(ProviderError::FetchFailed(
                "no GFS cycle published on NOMADS in the last 24 hours".to_string(),
            ));
        };
        let points = combine_components(&u, &v, &request.bbox, time)?;

        debug!(
            cycle = %cycle,
            time_index = time_index(cycle, time),
            step = step,
            points = points.len(),
            latency_ms = started.elapsed().as_millis() as u64,
            "NOMADS fetch complete"
        );

        Ok(assemble_field(
            WindSource::Nomads,
            time,
            request.bbox,
            resolution_km,
            points,
        ))
    }
}
