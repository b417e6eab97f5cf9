//! YAML configuration for the animator.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use wind_cache::CacheConfig;
use wind_providers::ProvidersConfig;

/// Provider and cache settings; same sections as the API config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    pub cache: CacheConfig,
    pub providers: ProvidersConfig,
}

impl AnimatorConfig {
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
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_api_style_file_is_accepted() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "cache:\n  ttl_secs: 60\nproviders:\n  priority: [gfs]\n  synthetic:\n    seed: 3"
        )
        .unwrap();

        let config = AnimatorConfig::load(file.path()).unwrap();
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.providers.priority.len(), 1);
        assert_eq!(config.providers.synthetic.seed, Some(3));
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = AnimatorConfig::load("/nonexistent/flow-animator.yaml").unwrap();
        assert_eq!(config, AnimatorConfig::default());
    }
}
