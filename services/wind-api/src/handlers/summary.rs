//! `GET /api/wind/summary` - read-only view of providers and cache.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use wind_cache::CacheStats;
use wind_common::{BeaufortLevel, WindSource, BEAUFORT_SCALE};
use wind_providers::{CooldownRecord, ProviderStatus};

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub providers: Vec<ProviderStatus>,
    pub priority: Vec<WindSource>,
    pub cooldowns: Vec<CooldownRecord>,
    pub cooldown_minutes: i64,
    pub cache: CacheSummary,
    pub beaufort: &'static [BeaufortLevel],
    pub started_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSummary {
    pub size: usize,
    pub capacity: usize,
    pub ttl_secs: u64,
    pub snap_grid_deg: f64,
    pub stats: CacheStats,
}

/// GET /api/wind/summary
pub async fn summary_handler(Extension(state): Extension<Arc<AppState>>) -> Json<SummaryResponse> {
    let registry = state.engine.registry();
    let cache = &state.cache;

    Json(SummaryResponse {
        providers: registry.statuses(),
        priority: registry.priority().to_vec(),
        cooldowns: registry.cooldowns(),
        cooldown_minutes: registry.cooldown_window().num_minutes(),
        cache: CacheSummary {
            size: cache.len().await,
            capacity: cache.capacity(),
            ttl_secs: cache.ttl().as_secs(),
            snap_grid_deg: cache.snap_grid_deg(),
            stats: cache.stats(),
        },
        beaufort: &BEAUFORT_SCALE,
        started_at: state.started_at,
        generated_at: Utc::now(),
    })
}
