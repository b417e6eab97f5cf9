//! Headless driver for the particle flow animation.
//!
//! Loads fields through the same cache and provider engine as the API,
//! animates them on a [`PixmapSurface`](particle_flow::PixmapSurface) and
//! writes periodic PNG snapshots. Optional panning exercises the viewport
//! move and debounced reload path.

pub mod config;
pub mod loader;
pub mod session;

pub use config::AnimatorConfig;
pub use loader::CacheEngineLoader;
pub use session::{run_session, SessionConfig, SessionReport};
