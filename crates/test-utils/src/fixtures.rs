//! Common test fixtures for wind-field tests.
//!
//! This module provides pre-defined test data that represents common
//! request scenarios.

/// Common bounding box definitions for testing.
pub mod bbox {
    use wind_common::BoundingBox;

    /// Sri Lanka, the region the service was first deployed for
    pub fn sri_lanka() -> BoundingBox {
        BoundingBox::new(79.5, 5.9, 82.0, 10.0)
    }

    /// A 2° × 2° box around the equator
    pub fn small() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 2.0, 2.0)
    }

    /// Spans the prime meridian (awkward for 0–360 longitude grids)
    pub fn prime_meridian() -> BoundingBox {
        BoundingBox::new(-5.0, 45.0, 5.0, 52.0)
    }

    /// Global bounding box (-180 to 180, -90 to 90)
    pub fn global() -> BoundingBox {
        BoundingBox::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Query-string forms used by API tests.
    pub const SRI_LANKA_QUERY: &str = "79.5,5.9,82.0,10.0";
    pub const INVERTED_QUERY: &str = "82.0,5.9,79.5,10.0";
    pub const OUT_OF_RANGE_QUERY: &str = "-200,5.9,82.0,10.0";
}

/// Common time values for testing.
pub mod time {
    use chrono::{DateTime, TimeZone, Utc};

    /// A fixed reference time for tests (2024-01-15T12:00:00Z)
    pub const REFERENCE_TIME: &str = "2024-01-15T12:00:00Z";

    /// [`REFERENCE_TIME`] as a `DateTime`.
    pub fn reference_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// GFS model run times
    pub const GFS_CYCLES: [&str; 4] = ["00", "06", "12", "18"];
}

/// Common resolutions (km).
pub mod resolution {
    pub const DEFAULT_KM: f64 = 25.0;
    pub const MIN_KM: f64 = 5.0;
    pub const MAX_KM: f64 = 100.0;
}
