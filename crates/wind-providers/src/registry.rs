//! Provider registry: adapters, cooldowns and call statistics.
//!
//! A provider that reports rate limiting is benched for a fixed window. Expired
//! cooldowns are purged lazily the next time they are looked at. State is per
//! registry instance, so tests and multiple engines never share it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use serde::Serialize;
use tracing::{info, warn};
use wind_common::{TimeRange, WindSource};

use crate::config::ProvidersConfig;
use crate::era5::Era5Provider;
use crate::error::{ProviderError, ProviderResult};
use crate::gfs::GfsProvider;
use crate::icon::IconProvider;
use crate::nomads::NomadsProvider;
use crate::provider::WindProvider;

/// A provider benched until `until`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownRecord {
    pub source: WindSource,
    pub until: DateTime<Utc>,
    pub reason: String,
}

/// Per-provider call counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStats {
    pub successes: u64,
    pub failures: u64,
    pub last_latency_ms: Option<u64>,
    pub last_error: Option<String>,
    pub last_success: Option<DateTime<Utc>>,
}

/// Everything the summary endpoint reports about one provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub source: WindSource,
    pub name: String,
    pub enabled: bool,
    pub cooling_down: bool,
    pub cooldown_until: Option<DateTime<Utc>>,
    pub cooldown_reason: Option<String>,
    pub time_coverage: TimeRange,
    #[serde(flatten)]
    pub stats: ProviderStats,
}

pub struct ProviderRegistry {
    providers: Vec<Arc<dyn WindProvider>>,
    priority: Vec<WindSource>,
    cooldown_window: Duration,
    cooldowns: Mutex<HashMap<WindSource, CooldownRecord>>,
    stats: Mutex<HashMap<WindSource, ProviderStats>>,
}

/// Lock a mutex, recovering the data if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ProviderRegistry {
    pub fn new(
        providers: Vec<Arc<dyn WindProvider>>,
        priority: Vec<WindSource>,
        cooldown_window: Duration,
    ) -> Self {
        Self {
            providers,
            priority,
            cooldown_window,
            cooldowns: Mutex::new(HashMap::new()),
            stats: Mutex::new(HashMap::new()),
        }
    }

    /// Registry with the four built-in adapters.
    pub fn from_config(config: &ProvidersConfig) -> ProviderResult<Self> {
        let providers: Vec<Arc<dyn WindProvider>> = vec![
            Arc::new(IconProvider::new(&config.icon)),
            Arc::new(GfsProvider::new(&config.gfs, config.max_points)?),
            Arc::new(Era5Provider::new(&config.era5)),
            Arc::new(NomadsProvider::new(&config.nomads, config.max_points)?),
        ];

        info!(
            priority = ?config.priority,
            cooldown_minutes = config.cooldown_minutes,
            "Provider registry initialized"
        );

        Ok(Self::new(
            providers,
            config.priority.clone(),
            Duration::minutes(config.cooldown_minutes),
        ))
    }

    pub fn provider(&self, source: WindSource) -> Option<Arc<dyn WindProvider>> {
        self.providers.iter().find(|p| p.id() == source).cloned()
    }

    /// Registered providers in registration order.
    pub fn providers(&self) -> &[Arc<dyn WindProvider>] {
        &self.providers
    }

    /// Order used for `auto` requests.
    pub fn priority(&self) -> &[WindSource] {
        &self.priority
    }

    pub fn cooldown_window(&self) -> Duration {
        self.cooldown_window
    }

    // ------------------------------------------------------------------
    // Cooldowns
    // ------------------------------------------------------------------

    pub fn is_cooling_down(&self, source: WindSource) -> bool {
        self.cooldown_at(source, Utc::now()).is_some()
    }

    /// Active cooldown for `source`, if any.
    pub fn cooldown(&self, source: WindSource) -> Option<CooldownRecord> {
        self.cooldown_at(source, Utc::now())
    }

    /// Active cooldown as of `now`. An expired record is removed.
    pub fn cooldown_at(&self, source: WindSource, now: DateTime<Utc>) -> Option<CooldownRecord> {
        let mut cooldowns = lock(&self.cooldowns);
        match cooldowns.get(&source) {
            Some(record) if now < record.until => Some(record.clone()),
            Some(_) => {
                cooldowns.remove(&source);
                info!(provider = %source, "Provider cooldown expired");
                None
            }
            None => None,
        }
    }

    /// Bench `source` for the cooldown window starting now.
    pub fn enter_cooldown(&self, source: WindSource, reason: impl Into<String>) -> CooldownRecord {
        let record = CooldownRecord {
            source,
            until: Utc::now() + self.cooldown_window,
            reason: reason.into(),
        };
        lock(&self.cooldowns).insert(source, record.clone());

        counter!("wind_provider_cooldowns_total", "provider" => source.as_str()).increment(1);
        warn!(
            provider = %source,
            until = %record.until,
            reason = %record.reason,
            "Provider entered cooldown"
        );
        record
    }

    pub fn clear_cooldown(&self, source: WindSource) -> bool {
        lock(&self.cooldowns).remove(&source).is_some()
    }

    /// All active cooldowns, oldest expiry first.
    pub fn cooldowns(&self) -> Vec<CooldownRecord> {
        let now = Utc::now();
        let mut cooldowns = lock(&self.cooldowns);
        cooldowns.retain(|_, record| now < record.until);
        let mut active: Vec<_> = cooldowns.values().cloned().collect();
        active.sort_by_key(|r| r.until);
        active
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    pub fn record_success(&self, source: WindSource, latency_ms: u64) {
        let mut stats = lock(&self.stats);
        let entry = stats.entry(source).or_default();
        entry.successes += 1;
        entry.last_latency_ms = Some(latency_ms);
        entry.last_success = Some(Utc::now());
    }

    pub fn record_failure(&self, source: WindSource, latency_ms: u64, error: &ProviderError) {
        let mut stats = lock(&self.stats);
        let entry = stats.entry(source).or_default();
        entry.failures += 1;
        entry.last_latency_ms = Some(latency_ms);
        entry.last_error = Some(error.to_string());
    }

    pub fn stats(&self, source: WindSource) -> ProviderStats {
        lock(&self.stats).get(&source).cloned().unwrap_or_default()
    }

    /// Status of every registered provider, in registration order.
    pub fn statuses(&self) -> Vec<ProviderStatus> {
        let now = Utc::now();
        self.providers
            .iter()
            .map(|provider| {
                let source = provider.id();
                let cooldown = self.cooldown_at(source, now);
                ProviderStatus {
                    source,
                    name: provider.name().to_string(),
                    enabled: provider.is_enabled(),
                    cooling_down: cooldown.is_some(),
                    cooldown_until: cooldown.as_ref().map(|c| c.until),
                    cooldown_reason: cooldown.map(|c| c.reason),
                    time_coverage: provider.time_coverage(now),
                    stats: self.stats(source),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_registry(window_minutes: i64) -> ProviderRegistry {
        ProviderRegistry::new(Vec::new(), Vec::new(), Duration::minutes(window_minutes))
    }

    #[test]
    fn test_cooldown_lifecycle() {
        let registry = empty_registry(60);
        assert!(!registry.is_cooling_down(WindSource::Gfs));

        let record = registry.enter_cooldown(WindSource::Gfs, "HTTP 429");
        assert!(registry.is_cooling_down(WindSource::Gfs));
        assert!(!registry.is_cooling_down(WindSource::Icon));
        assert_eq!(registry.cooldowns(), vec![record.clone()]);

        // Past the window the record is purged on lookup
        let later = record.until + Duration::seconds(1);
        assert!(registry.cooldown_at(WindSource::Gfs, later).is_none());
        assert!(registry.cooldowns().is_empty());
    }

    #[test]
    fn test_cooldown_window_length() {
        let registry = empty_registry(60);
        let before = Utc::now();
        let record = registry.enter_cooldown(WindSource::Icon, "quota");
        let length = record.until - before;
        assert!(length >= Duration::minutes(60));
        assert!(length < Duration::minutes(61));
    }

    #[test]
    fn test_stats_accumulate() {
        let registry = empty_registry(60);
        registry.record_success(WindSource::Gfs, 120);
        registry.record_failure(WindSource::Gfs, 30, &ProviderError::Timeout("30s".into()));

        let stats = registry.stats(WindSource::Gfs);
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.last_latency_ms, Some(30));
        assert!(stats.last_error.unwrap().contains("timed out"));
    }

    #[test]
    fn test_from_config_registers_all_providers() {
        let registry = ProviderRegistry::from_config(&ProvidersConfig::default()).unwrap();
        let ids: Vec<_> = registry.providers().iter().map(|p| p.id()).collect();
        assert_eq!(
            ids,
            vec![WindSource::Icon, WindSource::Gfs, WindSource::Era5, WindSource::Nomads]
        );
        assert_eq!(registry.statuses().len(), 4);
    }
}
