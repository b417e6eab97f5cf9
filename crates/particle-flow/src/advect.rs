//! The pure physics step.
//!
//! Nothing here touches the field lookup or a drawing surface: the caller
//! samples (u, v) at the particle and [`advect`] decides where it goes.

use crate::particle::{Particle, ParticlePhase};

/// Tuning for one advection step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvectionParams {
    /// Degrees moved per tick for 1 m/s. Folds zoom and frame time together.
    pub degrees_per_ms: f64,
    /// Samples weaker than this (m/s) count as calm.
    pub min_magnitude: f64,
    /// Extra age added on a stalled tick.
    pub stall_aging: u32,
}

impl AdvectionParams {
    /// Parameters that move a particle `pixels_per_ms` pixels per tick for
    /// each m/s of wind at the given zoom.
    pub fn for_zoom(degrees_per_pixel: f64, pixels_per_ms: f64) -> Self {
        Self {
            degrees_per_ms: degrees_per_pixel * pixels_per_ms,
            ..Self::default()
        }
    }
}

impl Default for AdvectionParams {
    fn default() -> Self {
        Self {
            degrees_per_ms: 0.002,
            min_magnitude: 0.05,
            stall_aging: 3,
        }
    }
}

/// Result of one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdvectionStep {
    /// Positions are `(lon, lat)`.
    Moved {
        from: (f64, f64),
        to: (f64, f64),
        speed: f64,
    },
    /// No sample, or too weak to move.
    Stalled,
}

/// Where `particle` goes given the vector sampled at its position.
pub fn advect(particle: &Particle, sample: Option<(f64, f64)>, params: &AdvectionParams) -> AdvectionStep {
    let Some((u, v)) = sample else {
        return AdvectionStep::Stalled;
    };
    let speed = (u * u + v * v).sqrt();
    if !(speed > params.min_magnitude) {
        return AdvectionStep::Stalled;
    }

    // Longitude degrees shrink towards the poles
    let lon_scale = particle.lat.to_radians().cos().max(0.01);
    let to = (
        particle.lon + u * params.degrees_per_ms / lon_scale,
        particle.lat + v * params.degrees_per_ms,
    );

    AdvectionStep::Moved {
        from: (particle.lon, particle.lat),
        to,
        speed,
    }
}

/// Apply a step to the particle, updating position, age and phase.
pub fn apply(particle: &mut Particle, step: &AdvectionStep, params: &AdvectionParams) {
    match *step {
        AdvectionStep::Moved { to, speed, .. } => {
            particle.lon = to.0;
            particle.lat = to.1;
            particle.speed = speed;
            particle.age = particle.age.saturating_add(1);
        }
        AdvectionStep::Stalled => {
            particle.speed = 0.0;
            particle.age = particle.age.saturating_add(1 + params.stall_aging);
        }
    }
    particle.phase = if particle.age > particle.max_age {
        ParticlePhase::Expired
    } else {
        ParticlePhase::Advecting
    };
}
