//! Provider configuration.
//!
//! Usually embedded in a service's YAML config under `providers:`. Every
//! field has a default so a partial (or missing) file still yields a working
//! setup.

use serde::{Deserialize, Serialize};
use wind_common::WindSource;

/// Per-adapter settings. Unset URL and timeout fall back to the adapter's own
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub enabled: bool,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            timeout_secs: None,
        }
    }
}

impl ProviderSettings {
    pub fn base_url_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.base_url.as_deref().unwrap_or(default)
    }

    pub fn timeout_or(&self, default: u64) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.unwrap_or(default))
    }
}

/// Synthetic fallback tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Fixed prevailing "from" direction; seasonal flow when unset.
    pub base_direction_deg: Option<f64>,
    /// Fixed prevailing speed (m/s); seasonal flow when unset.
    pub base_speed: Option<f64>,
    /// Half-width of the uniform random jitter added to u and v (m/s).
    pub jitter: f64,
    /// Seed for reproducible output.
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            base_direction_deg: None,
            base_speed: None,
            jitter: 0.5,
            seed: None,
        }
    }
}

/// Everything the provider layer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Order providers are tried in `auto` mode.
    pub priority: Vec<WindSource>,
    /// How long a rate-limited provider is skipped.
    pub cooldown_minutes: i64,
    /// Upper bound on lattice points per fetch; resolution is coarsened to fit.
    pub max_points: usize,
    pub icon: ProviderSettings,
    pub gfs: ProviderSettings,
    pub era5: ProviderSettings,
    pub nomads: ProviderSettings,
    pub synthetic: SyntheticConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            priority: vec![
                WindSource::Icon,
                WindSource::Gfs,
                WindSource::Era5,
                WindSource::Nomads,
            ],
            cooldown_minutes: 60,
            max_points: 2500,
            icon: ProviderSettings::default(),
            gfs: ProviderSettings::default(),
            era5: ProviderSettings::default(),
            nomads: ProviderSettings::default(),
            synthetic: SyntheticConfig::default(),
        }
    }
}
