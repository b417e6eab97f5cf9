//! Field loading through the cache and provider engine.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use particle_flow::FieldLoader;
use tracing::debug;
use wind_cache::FieldCache;
use wind_common::{WindField, WindRequest};
use wind_providers::WindFieldEngine;

use crate::config::AnimatorConfig;

/// [`FieldLoader`] backed by a [`FieldCache`] in front of a
/// [`WindFieldEngine`]. Never fails: the engine falls back to synthetic data.
pub struct CacheEngineLoader {
    cache: FieldCache,
    engine: WindFieldEngine,
}

impl CacheEngineLoader {
    pub fn new(cache: FieldCache, engine: WindFieldEngine) -> Self {
        Self { cache, engine }
    }

    pub fn from_config(config: &AnimatorConfig) -> Result<Self> {
        let engine = WindFieldEngine::from_config(&config.providers)
            .context("Failed to initialize provider engine")?;
        Ok(Self::new(FieldCache::new(&config.cache), engine))
    }

    pub fn cache(&self) -> &FieldCache {
        &self.cache
    }
}

#[async_trait]
impl FieldLoader for CacheEngineLoader {
    async fn load(&self, request: &WindRequest) -> Arc<WindField> {
        let engine = &self.engine;
        let cached = self
            .cache
            .get_cached_wind_field(
                request.source,
                &request.bbox,
                request.effective_time(),
                request.resolution_km,
                |key| async move { engine.get_wind_field(&key.to_request()).await },
            )
            .await;

        debug!(
            key = %cached.key,
            cache = cached.status.as_str(),
            source = %cached.field.source(),
            points = cached.field.len(),
            "Loaded field for animation"
        );
        cached.field
    }
}
