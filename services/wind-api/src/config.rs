//! Service configuration loaded from YAML.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use wind_cache::CacheConfig;
use wind_providers::ProvidersConfig;

/// Request limits for `GET /api/wind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiLimits {
    pub min_resolution_km: f64,
    pub max_resolution_km: f64,
    pub default_resolution_km: f64,
}

impl Default for ApiLimits {
    fn default() -> Self {
        Self {
            min_resolution_km: 5.0,
            max_resolution_km: 100.0,
            default_resolution_km: 25.0,
        }
    }
}

/// Everything `wind-api` reads from its config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindApiConfig {
    pub api: ApiLimits,
    pub cache: CacheConfig,
    pub providers: ProvidersConfig,
}

impl WindApiConfig {
    /// Load from a YAML file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file does not exist, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            priority = ?config.providers.priority,
            cache_capacity = config.cache.capacity,
            "Loaded configuration"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_is_default() {
        let config = WindApiConfig::load("/nonexistent/wind-api.yaml").unwrap();
        assert_eq!(config, WindApiConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cache:\n  capacity: 10\napi:\n  max_resolution_km: 50").unwrap();

        let config = WindApiConfig::load(file.path()).unwrap();
        assert_eq!(config.cache.capacity, 10);
        assert_eq!(config.cache.ttl_secs, 1800);
        assert_eq!(config.api.max_resolution_km, 50.0);
        assert_eq!(config.api.min_resolution_km, 5.0);
        assert_eq!(config.providers.cooldown_minutes, 60);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cache: [not, a, map]").unwrap();
        assert!(WindApiConfig::load(file.path()).is_err());
    }
}
