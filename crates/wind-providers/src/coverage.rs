//! Geographic and temporal coverage of a provider.

use chrono::{DateTime, Duration, TimeZone, Utc};
use wind_common::{BoundingBox, TimeRange};

/// The span of valid times a provider can answer for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeWindow {
    /// Forecast models: a window that moves with the current time.
    /// A request without a time means "now" and is always inside.
    Rolling { past: Duration, future: Duration },
    /// Reanalysis archives: only times at least `min_age` old and not before
    /// `earliest`. A request without a time is never served.
    Archive {
        min_age: Duration,
        earliest: DateTime<Utc>,
    },
}

impl TimeWindow {
    /// Forecast window from `past_hours` ago to `future_hours` ahead.
    pub fn rolling_hours(past_hours: i64, future_hours: i64) -> Self {
        TimeWindow::Rolling {
            past: Duration::hours(past_hours),
            future: Duration::hours(future_hours),
        }
    }

    /// The ERA5-style archive window: five days behind real time, back to 1940.
    pub fn reanalysis() -> Self {
        TimeWindow::Archive {
            min_age: Duration::days(5),
            earliest: Utc
                .with_ymd_and_hms(1940, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Concrete time range relative to `now`.
    pub fn range(&self, now: DateTime<Utc>) -> TimeRange {
        match *self {
            TimeWindow::Rolling { past, future } => TimeRange::new(now - past, now + future),
            TimeWindow::Archive { min_age, earliest } => TimeRange::new(earliest, now - min_age),
        }
    }

    pub fn serves(&self, time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match (self, time) {
            (TimeWindow::Rolling { .. }, None) => true,
            (TimeWindow::Archive { .. }, None) => false,
            (_, Some(t)) => self.range(now).contains(&t),
        }
    }
}

/// Where and when a provider has data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    pub region: BoundingBox,
    pub window: TimeWindow,
}

impl Coverage {
    /// Global coverage with the given time window.
    pub fn global(window: TimeWindow) -> Self {
        Self {
            region: BoundingBox::new(-180.0, -90.0, 180.0, 90.0),
            window,
        }
    }

    pub fn covers(&self, bbox: &BoundingBox, time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        self.region.contains_bbox(bbox) && self.window.serves(time, now)
    }
}
