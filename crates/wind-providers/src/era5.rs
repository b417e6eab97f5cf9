//! ECMWF ERA5 reanalysis adapter.
//!
//! ERA5 is served through the Copernicus CDS job API (submit, poll, download).
//! That flow is not wired up, so every fetch fails. Coverage is real: only
//! times at least five days old are accepted, which keeps `auto` requests for
//! the present from ever reaching this adapter.

use async_trait::async_trait;
use tracing::debug;
use wind_common::{WindField, WindRequest, WindSource};

use crate::config::ProviderSettings;
use crate::coverage::{Coverage, TimeWindow};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::WindProvider;

pub const DEFAULT_BASE_URL: &str = "https://cds.climate.copernicus.eu/api";

pub struct Era5Provider {
    enabled: bool,
    base_url: String,
}

impl Era5Provider {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            enabled: settings.enabled,
            base_url: settings.base_url_or(DEFAULT_BASE_URL).to_string(),
        }
    }
}

#[async_trait]
impl WindProvider for Era5Provider {
    fn id(&self) -> WindSource {
        WindSource::Era5
    }

    fn name(&self) -> &str {
        "ECMWF ERA5"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn coverage(&self) -> Coverage {
        Coverage::global(TimeWindow::reanalysis())
    }

    async fn fetch_wind_field(&self, request: &WindRequest) -> ProviderResult<WindField> {
        debug!(base_url = %self.base_url, time = ?request.time, "ERA5 fetch requested");
        Err(ProviderError::NotImplemented(
            "ERA5 CDS job submission is not available".to_string(),
        ))
    }
}
