//! Wind provider adapters and the fallback engine.
//!
//! Each upstream source sits behind the [`WindProvider`] trait. The
//! [`ProviderRegistry`] owns the adapters together with their cooldown state
//! and call statistics, and the [`WindFieldEngine`] walks them in priority
//! order, falling back to the [`SyntheticGenerator`] so a caller always gets a
//! field back.

pub mod config;
pub mod coverage;
pub mod dods;
pub mod engine;
pub mod era5;
pub mod error;
pub mod gfs;
pub mod icon;
pub mod nomads;
pub mod provider;
pub mod registry;
pub mod synthetic;

pub use config::{ProviderSettings, ProvidersConfig, SyntheticConfig};
pub use coverage::{Coverage, TimeWindow};
pub use engine::{AttemptOutcome, FallbackReason, FetchAttempt, Resolution, WindFieldEngine};
pub use era5::Era5Provider;
pub use error::{ProviderError, ProviderResult};
pub use gfs::GfsProvider;
pub use icon::IconProvider;
pub use nomads::NomadsProvider;
pub use provider::WindProvider;
pub use registry::{CooldownRecord, ProviderRegistry, ProviderStats, ProviderStatus};
pub use synthetic::SyntheticGenerator;
