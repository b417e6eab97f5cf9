//! Fusion engine: pick a provider, fall back, never fail.
//!
//! `auto` requests walk the priority list one provider at a time and stop at
//! the first field with points. A request naming a provider gets exactly one
//! attempt. Whatever goes wrong, the caller receives a field: synthetic data
//! stands in when no provider delivers.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use wind_common::{SourceSelection, WindField, WindRequest, WindSource};

use crate::config::ProvidersConfig;
use crate::error::ProviderResult;
use crate::provider::WindProvider;
use crate::registry::ProviderRegistry;
use crate::synthetic::SyntheticGenerator;

/// What happened when a provider was considered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success { points: usize },
    /// Fetched fine but returned no points.
    Empty,
    Failed { kind: String, message: String, rate_limited: bool },
    /// Skipped without calling the adapter.
    CoolingDown,
    /// Skipped: `can_serve` was false.
    Unservable,
    /// The requested provider is not registered.
    NotRegistered,
}

impl AttemptOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Success { .. } => "success",
            AttemptOutcome::Empty => "empty",
            AttemptOutcome::Failed { .. } => "failed",
            AttemptOutcome::CoolingDown => "cooling_down",
            AttemptOutcome::Unservable => "unservable",
            AttemptOutcome::NotRegistered => "not_registered",
        }
    }

    /// Whether the adapter was actually called.
    pub fn invoked(&self) -> bool {
        matches!(
            self,
            AttemptOutcome::Success { .. } | AttemptOutcome::Empty | AttemptOutcome::Failed { .. }
        )
    }
}

/// One entry in the attempt trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchAttempt {
    pub source: WindSource,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
    pub latency_ms: u64,
}

/// Why the synthetic generator was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The named provider is benched.
    CoolingDown,
    /// The named provider cannot serve the request or is not registered.
    Unavailable,
    /// The named provider errored.
    Failed,
    /// The named provider returned no points.
    Empty,
    /// `auto`: every provider was skipped or failed.
    Exhausted,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::CoolingDown => "cooling_down",
            FallbackReason::Unavailable => "unavailable",
            FallbackReason::Failed => "failed",
            FallbackReason::Empty => "empty",
            FallbackReason::Exhausted => "exhausted",
        }
    }

    fn from_outcome(outcome: &AttemptOutcome) -> Self {
        match outcome {
            AttemptOutcome::CoolingDown => FallbackReason::CoolingDown,
            AttemptOutcome::Unservable | AttemptOutcome::NotRegistered => FallbackReason::Unavailable,
            AttemptOutcome::Failed { .. } => FallbackReason::Failed,
            AttemptOutcome::Empty | AttemptOutcome::Success { .. } => FallbackReason::Empty,
        }
    }
}

/// A resolved field plus how it was obtained.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub field: WindField,
    pub attempts: Vec<FetchAttempt>,
    /// Set when the field is synthetic.
    pub fallback: Option<FallbackReason>,
}

pub struct WindFieldEngine {
    registry: Arc<ProviderRegistry>,
    synthetic: SyntheticGenerator,
}

impl WindFieldEngine {
    pub fn new(registry: Arc<ProviderRegistry>, synthetic: SyntheticGenerator) -> Self {
        Self {
            registry,
            synthetic,
        }
    }

    /// Engine over the built-in adapters.
    pub fn from_config(config: &ProvidersConfig) -> ProviderResult<Self> {
        let registry = Arc::new(ProviderRegistry::from_config(config)?);
        let synthetic = SyntheticGenerator::new(config.synthetic.clone(), config.max_points);
        Ok(Self::new(registry, synthetic))
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// A field for the request. Never fails and never returns an empty field.
    pub async fn get_wind_field(&self, request: &WindRequest) -> WindField {
        self.resolve(request).await.field
    }

    /// Like [`get_wind_field`](Self::get_wind_field), also returning the
    /// attempt trail.
    #[instrument(skip(self, request), fields(source = %request.source, bbox = ?request.bbox))]
    pub async fn resolve(&self, request: &WindRequest) -> Resolution {
        let mut attempts = Vec::new();

        let candidates: Vec<WindSource> = match request.source {
            SourceSelection::Provider(source) => vec![source],
            SourceSelection::Auto => self.registry.priority().to_vec(),
        };

        for source in candidates {
            let (field, attempt) = self.attempt(source, request).await;
            attempts.push(attempt);
            if let Some(field) = field {
                info!(
                    provider = %source,
                    points = field.points.len(),
                    attempts = attempts.len(),
                    "Wind field resolved"
                );
                return Resolution {
                    field,
                    attempts,
                    fallback: None,
                };
            }
        }

        let reason = match (request.source, attempts.last()) {
            (SourceSelection::Provider(_), Some(last)) => FallbackReason::from_outcome(&last.outcome),
            _ => FallbackReason::Exhausted,
        };
        counter!("wind_fallback_total", "reason" => reason.as_str()).increment(1);
        warn!(
            reason = reason.as_str(),
            attempts = attempts.len(),
            "No provider delivered, using synthetic field"
        );

        let field = self
            .synthetic
            .generate(&request.bbox, request.effective_time(), request.resolution_km);

        Resolution {
            field,
            attempts,
            fallback: Some(reason),
        }
    }

    /// Consider one provider. Returns the field only if it has points.
    async fn attempt(&self, source: WindSource, request: &WindRequest) -> (Option<WindField>, FetchAttempt) {
        let skipped = |outcome: AttemptOutcome| {
            debug!(provider = %source, outcome = outcome.label(), "Provider skipped");
            (
                None,
                FetchAttempt {
                    source,
                    outcome,
                    latency_ms: 0,
                },
            )
        };

        let Some(provider) = self.registry.provider(source) else {
            return skipped(AttemptOutcome::NotRegistered);
        };
        if self.registry.is_cooling_down(source) {
            return skipped(AttemptOutcome::CoolingDown);
        }
        if !provider.can_serve(request) {
            return skipped(AttemptOutcome::Unservable);
        }

        self.invoke(provider.as_ref(), request).await
    }

    async fn invoke(
        &self,
        provider: &dyn WindProvider,
        request: &WindRequest,
    ) -> (Option<WindField>, FetchAttempt) {
        let source = provider.id();
        let started = Instant::now();
        let result = provider.fetch_wind_field(request).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        histogram!("wind_provider_latency_ms", "provider" => source.as_str()).record(latency_ms as f64);

        let (field, outcome) = match result {
            Ok(field) if !field.points.is_empty() => {
                self.registry.record_success(source, latency_ms);
                let points = field.points.len();
                (Some(field), AttemptOutcome::Success { points })
            }
            Ok(_) => {
                self.registry.record_success(source, latency_ms);
                warn!(provider = %source, latency_ms = latency_ms, "Provider returned no points");
                (None, AttemptOutcome::Empty)
            }
            Err(err) => {
                self.registry.record_failure(source, latency_ms, &err);
                let rate_limited = err.is_rate_limited();
                if rate_limited {
                    self.registry.enter_cooldown(source, err.to_string());
                }
                warn!(
                    provider = %source,
                    latency_ms = latency_ms,
                    error = %err,
                    rate_limited = rate_limited,
                    "Provider fetch failed"
                );
                (
                    None,
                    AttemptOutcome::Failed {
                        kind: err.kind().to_string(),
                        message: err.to_string(),
                        rate_limited,
                    },
                )
            }
        };

        counter!(
            "wind_provider_requests_total",
            "provider" => source.as_str(),
            "outcome" => outcome.label()
        )
        .increment(1);

        (
            field,
            FetchAttempt {
                source,
                outcome,
                latency_ms,
            },
        )
    }
}
