//! Common types and utilities shared across the wind flow crates and services.

pub mod bbox;
pub mod beaufort;
pub mod error;
pub mod field;
pub mod request;
pub mod time;

pub use bbox::{BboxParseError, BoundingBox};
pub use beaufort::{beaufort_force, BeaufortLevel, BEAUFORT_SCALE};
pub use error::{WindError, WindResult};
pub use field::{direction_from_components, WindField, WindFieldMetadata, WindPoint, WindSource};
pub use request::{SourceSelection, WindRequest};
pub use time::{parse_request_time, round_to_hour, TimeParseError, TimeRange};
