//! Particle flow animation over wind fields.
//!
//! The physics ([`advect`]) is pure and works in geographic coordinates. The
//! [`FlowSimulator`] owns particle state and turns each tick into pixel
//! [`TrailSegment`]s, which a [`RenderSurface`] accumulates with a per-frame
//! fade. [`FlowAnimator`] runs the loop on a single task and [`FieldFeed`]
//! debounces field reloads into it.

pub mod advect;
pub mod animator;
pub mod debounce;
pub mod error;
pub mod feed;
pub mod gradient;
pub mod particle;
pub mod simulator;
pub mod surface;
pub mod viewport;

pub use advect::{advect, AdvectionParams, AdvectionStep};
pub use animator::{AnimatorEvent, FlowAnimator, FrameStats};
pub use debounce::Debouncer;
pub use error::{RenderError, RenderResult};
pub use feed::{FieldFeed, FieldLoader};
pub use gradient::{Rgba, SpeedGradient};
pub use particle::{trail_opacity, Particle, ParticlePhase};
pub use simulator::{FlowSimulator, SimulatorConfig, TrailSegment};
pub use surface::{PixmapSurface, RenderSurface};
pub use viewport::Viewport;
