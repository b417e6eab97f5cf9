//! Application state for the wind API.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use wind_cache::FieldCache;
use wind_providers::WindFieldEngine;

use crate::config::WindApiConfig;

/// Shared application state.
pub struct AppState {
    /// Provider fusion engine; never fails to produce a field.
    pub engine: WindFieldEngine,

    /// In-process field cache in front of the engine.
    pub cache: FieldCache,

    pub config: WindApiConfig,

    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build the engine and cache from configuration.
    pub fn new(config: WindApiConfig) -> Result<Self> {
        let engine = WindFieldEngine::from_config(&config.providers)
            .context("Failed to initialize provider engine")?;
        Ok(Self::with_engine(config, engine))
    }

    /// State around an existing engine.
    pub fn with_engine(config: WindApiConfig, engine: WindFieldEngine) -> Self {
        let cache = FieldCache::new(&config.cache);
        Self {
            engine,
            cache,
            config,
            started_at: Utc::now(),
        }
    }
}
