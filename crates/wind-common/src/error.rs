//! Error types for wind field requests.

use thiserror::Error;

use crate::bbox::BboxParseError;
use crate::time::TimeParseError;

/// Result type alias using WindError.
pub type WindResult<T> = Result<T, WindError>;

/// Primary error type for user-facing wind field operations.
///
/// Provider failures never surface here; they are absorbed by the fusion
/// engine. Only malformed requests and internal faults do.
#[derive(Debug, Error)]
pub enum WindError {
    // === Request Validation Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid bbox: {0}")]
    InvalidBbox(#[from] BboxParseError),

    #[error("Invalid time: {0}")]
    InvalidTime(#[from] TimeParseError),

    #[error("Invalid resolutionKm: {0}")]
    InvalidResolution(String),

    #[error("Unsupported source: {0}. Expected auto, icon, gfs, era5 or nomads")]
    UnsupportedSource(String),

    #[error("Unsupported format: {0}. Expected full or compact")]
    UnsupportedFormat(String),

    // === Infrastructure Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WindError {
    /// Short machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            WindError::MissingParameter(_) => "missing_parameter",
            WindError::InvalidParameter { .. } => "invalid_parameter",
            WindError::InvalidBbox(_) => "invalid_bbox",
            WindError::InvalidTime(_) => "invalid_time",
            WindError::InvalidResolution(_) => "invalid_resolution",
            WindError::UnsupportedSource(_) => "unsupported_source",
            WindError::UnsupportedFormat(_) => "unsupported_format",
            WindError::Internal(_) => "internal_error",
        }
    }

    /// Whether this error was caused by a malformed request.
    pub fn is_request_error(&self) -> bool {
        !matches!(self, WindError::Internal(_))
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        if self.is_request_error() {
            400
        } else {
            500
        }
    }
}

impl From<serde_json::Error> for WindError {
    fn from(err: serde_json::Error) -> Self {
        WindError::Internal(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(WindError::MissingParameter("bbox".into()).http_status_code(), 400);
        assert_eq!(WindError::InvalidBbox(BboxParseError::Inverted).http_status_code(), 400);
        assert_eq!(WindError::Internal("boom".into()).http_status_code(), 500);
    }

    #[test]
    fn test_display_includes_detail() {
        let err = WindError::InvalidResolution("must be within [5, 100], got 2".into());
        let display = err.to_string();
        assert!(display.contains("resolutionKm"));
        assert!(display.contains("got 2"));
    }
}
