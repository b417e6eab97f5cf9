//! Response bodies and error mapping for the wind endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use wind_cache::{CacheStatus, CachedField};
use wind_common::{SourceSelection, WindError, WindFieldMetadata, WindPoint};
use wind_grid::ValidationReport;

use crate::query::ResponseFormat;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Wraps [`WindError`] so handlers can return it directly.
#[derive(Debug)]
pub struct ApiError(pub WindError);

impl From<WindError> for ApiError {
    fn from(err: WindError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Rejected request");
        }

        let body = ErrorBody {
            error: self.0.code(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Field responses
// ============================================================================

/// Field metadata plus what the service adds on top.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(flatten)]
    pub field: WindFieldMetadata,
    pub requested_source: &'static str,
    pub point_count: usize,
    pub cache: CacheStatus,
    pub cache_key: String,
    pub expires_at: DateTime<Utc>,
    pub validation: ValidationReport,
}

impl ResponseMetadata {
    pub fn new(
        cached: &CachedField,
        requested_source: SourceSelection,
        validation: ValidationReport,
    ) -> Self {
        Self {
            field: cached.field.metadata.clone(),
            requested_source: requested_source.as_str(),
            point_count: cached.field.len(),
            cache: cached.status,
            cache_key: cached.key.as_str().to_string(),
            expires_at: cached.expires_at,
            validation,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FullResponse {
    pub metadata: ResponseMetadata,
    pub points: Vec<WindPoint>,
}

/// Bandwidth-reduced body: points as `[lat, lon, u, v]`.
#[derive(Debug, Serialize)]
pub struct CompactResponse {
    pub meta: ResponseMetadata,
    pub pts: Vec<[f64; 4]>,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Coordinates keep four decimals (about 10 m), components two.
pub fn compact_point(point: &WindPoint) -> [f64; 4] {
    [
        round_to(point.lat, 4),
        round_to(point.lon, 4),
        round_to(point.u, 2),
        round_to(point.v, 2),
    ]
}

/// Render a cached field in the requested format.
pub fn field_response(
    cached: &CachedField,
    requested_source: SourceSelection,
    validation: ValidationReport,
    format: ResponseFormat,
) -> Response {
    let metadata = ResponseMetadata::new(cached, requested_source, validation);
    match format {
        ResponseFormat::Full => Json(FullResponse {
            metadata,
            points: cached.field.points.clone(),
        })
        .into_response(),
        ResponseFormat::Compact => Json(CompactResponse {
            meta: metadata,
            pts: cached.field.points.iter().map(compact_point).collect(),
        })
        .into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub cleared: usize,
}
