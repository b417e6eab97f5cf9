//! DWD ICON adapter.
//!
//! ICON publishes GRIB2 files on the DWD open-data server. Decoding them is
//! not wired up, so every fetch fails and the engine moves on to the next
//! provider. The adapter still reports real coverage so the summary endpoint
//! and `can_serve` behave as they will once decoding lands.

use async_trait::async_trait;
use tracing::debug;
use wind_common::{WindField, WindRequest, WindSource};

use crate::config::ProviderSettings;
use crate::coverage::{Coverage, TimeWindow};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::WindProvider;

pub const DEFAULT_BASE_URL: &str = "https://opendata.dwd.de/weather/nwp/icon/grib";

pub struct IconProvider {
    enabled: bool,
    base_url: String,
}

impl IconProvider {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            enabled: settings.enabled,
            base_url: settings.base_url_or(DEFAULT_BASE_URL).to_string(),
        }
    }
}

#[async_trait]
impl WindProvider for IconProvider {
    fn id(&self) -> WindSource {
        WindSource::Icon
    }

    fn name(&self) -> &str {
        "DWD ICON"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn coverage(&self) -> Coverage {
        Coverage::global(TimeWindow::rolling_hours(6, 180))
    }

    async fn fetch_wind_field(&self, request: &WindRequest) -> ProviderResult<WindField> {
        debug!(base_url = %self.base_url, bbox = ?request.bbox, "ICON fetch requested");
        Err(ProviderError::NotImplemented(
            "ICON GRIB2 decoding is not available".to_string(),
        ))
    }
}
