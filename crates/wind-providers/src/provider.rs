//! The adapter seam every upstream source implements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use wind_common::{TimeRange, WindField, WindRequest, WindSource};

use crate::coverage::Coverage;
use crate::error::ProviderResult;

/// An upstream source of wind fields.
///
/// Adapters are independent of each other and never swallow errors: a failed
/// fetch is returned as a [`ProviderError`](crate::ProviderError) and the
/// engine decides what to do with it.
#[async_trait]
pub trait WindProvider: Send + Sync {
    /// Stable identifier, also used as the cooldown key.
    fn id(&self) -> WindSource;

    /// Human-readable name.
    fn name(&self) -> &str;

    fn is_enabled(&self) -> bool;

    fn coverage(&self) -> Coverage;

    /// Whether a fetch is worth attempting: enabled, inside the region and
    /// inside the time window.
    fn can_serve(&self, request: &WindRequest) -> bool {
        self.is_enabled() && self.coverage().covers(&request.bbox, request.time, Utc::now())
    }

    /// Times this provider currently answers for.
    fn time_coverage(&self, now: DateTime<Utc>) -> TimeRange {
        self.coverage().window.range(now)
    }

    async fn fetch_wind_field(&self, request: &WindRequest) -> ProviderResult<WindField>;
}
