//! Wind API Service Library
//!
//! HTTP front end for the wind field engine: validated field requests served
//! through the TTL cache, cache administration, and a read-only summary of
//! provider health.

pub mod config;
pub mod handlers;
pub mod query;
pub mod response;
pub mod state;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the service router. `/metrics` answers 503 without a recorder handle.
pub fn build_router(state: Arc<AppState>, prometheus: Option<PrometheusHandle>) -> Router {
    Router::new()
        .route(
            "/api/wind",
            get(handlers::wind::get_wind_handler).delete(handlers::wind::clear_cache_handler),
        )
        .route("/api/wind/summary", get(handlers::summary::summary_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(Extension(prometheus))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
