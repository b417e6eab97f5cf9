//! `GET /api/wind` and `DELETE /api/wind`.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    Json,
};
use metrics::{counter, histogram};
use tracing::{info, instrument, warn};
use wind_grid::validate_field;

use crate::query::WindQuery;
use crate::response::{field_response, ApiError, ClearResponse};
use crate::state::AppState;

/// GET /api/wind - Wind field for a bounding box
#[instrument(skip(state))]
pub async fn get_wind_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<WindQuery>,
) -> Result<Response, ApiError> {
    let start = Instant::now();

    let validated = match query.validate(&state.config.api) {
        Ok(validated) => validated,
        Err(e) => {
            counter!("wind_api_requests_total", "status" => "rejected").increment(1);
            return Err(e.into());
        }
    };
    let request = &validated.request;

    let engine = &state.engine;
    // Fields failing validation are served once but never cached
    let cached = state
        .cache
        .get_cached_wind_field_if(
            request.source,
            &request.bbox,
            request.effective_time(),
            request.resolution_km,
            |key| async move { engine.get_wind_field(&key.to_request()).await },
            |field| validate_field(field).valid,
        )
        .await;

    let validation = validate_field(&cached.field);
    if !validation.valid {
        warn!(
            key = %cached.key,
            issues = validation.issues.len(),
            cache = cached.status.as_str(),
            "Served field failed validation"
        );
    }

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    counter!("wind_api_requests_total", "status" => "ok").increment(1);
    histogram!("wind_api_request_duration_ms", "cache" => cached.status.as_str())
        .record(elapsed_ms);

    info!(
        key = %cached.key,
        source = %cached.field.source(),
        cache = cached.status.as_str(),
        points = cached.field.len(),
        format = validated.format.as_str(),
        elapsed_ms,
        "Served wind field"
    );

    Ok(field_response(
        &cached,
        request.source,
        validation,
        validated.format,
    ))
}

/// DELETE /api/wind - Drop every cached field
pub async fn clear_cache_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let cleared = state.cache.clear().await;
    info!(cleared, "Cleared wind field cache");
    Json(ClearResponse {
        success: true,
        cleared,
    })
}
