//! Provider configuration as it appears in service YAML files.

use wind_common::WindSource;
use wind_providers::{ProvidersConfig, WindFieldEngine};

const YAML: &str = r#"
priority: [gfs, nomads, icon]
cooldown_minutes: 15
max_points: 900
icon:
  enabled: false
gfs:
  base_url: http://localhost:8081/v1/forecast
  timeout_secs: 10
synthetic:
  base_direction_deg: 225
  base_speed: 4.5
  seed: 11
"#;

#[test]
fn test_yaml_overrides_and_defaults() {
    let config: ProvidersConfig = serde_yaml::from_str(YAML).unwrap();

    assert_eq!(
        config.priority,
        vec![WindSource::Gfs, WindSource::Nomads, WindSource::Icon]
    );
    assert_eq!(config.cooldown_minutes, 15);
    assert_eq!(config.max_points, 900);
    assert!(!config.icon.enabled);
    assert_eq!(
        config.gfs.base_url_or("unused"),
        "http://localhost:8081/v1/forecast"
    );
    assert_eq!(config.gfs.timeout_or(30).as_secs(), 10);
    // Untouched sections keep their defaults
    assert!(config.nomads.enabled);
    assert!(config.era5.base_url.is_none());
    assert_eq!(config.synthetic.jitter, 0.5);
    assert_eq!(config.synthetic.seed, Some(11));
}

#[test]
fn test_empty_yaml_is_default() {
    let config: ProvidersConfig = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config, ProvidersConfig::default());
}

#[test]
fn test_engine_from_yaml_config() {
    let config: ProvidersConfig = serde_yaml::from_str(YAML).unwrap();
    let engine = WindFieldEngine::from_config(&config).unwrap();

    let registry = engine.registry();
    assert_eq!(registry.priority()[0], WindSource::Gfs);
    assert_eq!(registry.cooldown_window().num_minutes(), 15);

    let icon = registry.provider(WindSource::Icon).unwrap();
    assert!(!icon.is_enabled());
}
