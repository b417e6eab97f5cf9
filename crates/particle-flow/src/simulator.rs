//! Stateful particle simulator.
//!
//! Owns the particles, the field lookup and the viewport. Each [`tick`]
//! respawns dead particles, advects the rest and returns the trail segments
//! to draw. Particles live in geographic coordinates; only the returned
//! segments are in pixels.
//!
//! [`tick`]: FlowSimulator::tick

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use wind_common::{BoundingBox, WindField};
use wind_grid::VectorGrid;

use crate::advect::{advect, apply, AdvectionParams, AdvectionStep};
use crate::gradient::{Rgba, SpeedGradient};
use crate::particle::{Particle, ParticlePhase};
use crate::viewport::Viewport;

/// Spawn positions keep this fraction of the spawn box clear at each edge.
const SPAWN_MARGIN: f64 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    pub particle_count: usize,
    /// Lifetimes are drawn uniformly from this inclusive range (ticks).
    pub min_age: u32,
    pub max_age: u32,
    /// Pixels moved per tick for 1 m/s.
    pub pixels_per_ms: f64,
    pub min_magnitude: f64,
    pub stall_aging: u32,
    pub line_width: f32,
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            particle_count: 2000,
            min_age: 40,
            max_age: 100,
            pixels_per_ms: 0.25,
            min_magnitude: 0.05,
            stall_aging: 3,
            line_width: 1.2,
            seed: None,
        }
    }
}

/// A stroke from one pixel position to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub color: Rgba,
    pub width: f32,
}

pub struct FlowSimulator {
    config: SimulatorConfig,
    viewport: Viewport,
    gradient: SpeedGradient,
    field: Option<Arc<WindField>>,
    lookup: Option<VectorGrid>,
    /// Declared field bbox clipped to the lattice extent.
    field_bounds: Option<BoundingBox>,
    particles: Vec<Particle>,
    params: AdvectionParams,
    rng: StdRng,
}

impl FlowSimulator {
    pub fn new(config: SimulatorConfig, viewport: Viewport) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let params = Self::params_for(&config, &viewport);

        Self {
            config,
            viewport,
            gradient: SpeedGradient::default(),
            field: None,
            lookup: None,
            field_bounds: None,
            particles: Vec::new(),
            params,
            rng,
        }
    }

    pub fn with_gradient(mut self, gradient: SpeedGradient) -> Self {
        self.gradient = gradient;
        self
    }

    fn params_for(config: &SimulatorConfig, viewport: &Viewport) -> AdvectionParams {
        AdvectionParams {
            min_magnitude: config.min_magnitude,
            stall_aging: config.stall_aging,
            ..AdvectionParams::for_zoom(viewport.degrees_per_pixel(), config.pixels_per_ms)
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn field(&self) -> Option<&Arc<WindField>> {
        self.field.as_ref()
    }

    pub fn field_bounds(&self) -> Option<BoundingBox> {
        self.field_bounds
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn params(&self) -> &AdvectionParams {
        &self.params
    }

    /// Where particles are (re)spawned: viewport ∩ field bounds.
    pub fn spawn_region(&self) -> Option<BoundingBox> {
        self.field_bounds?.intersection(&self.viewport.bounds)
    }

    /// Replace the field. Rebuilds the lookup and every particle.
    ///
    /// A field without a usable lattice (fewer than 2×2 nodes) leaves the
    /// simulator idle until the next field arrives.
    pub fn set_field(&mut self, field: Arc<WindField>) {
        self.lookup = VectorGrid::from_field(&field);
        self.field_bounds = self.lookup.as_ref().map(|grid| {
            field
                .metadata
                .bbox
                .intersection(grid.extent())
                .unwrap_or(*grid.extent())
        });
        if self.lookup.is_none() {
            debug!(points = field.points.len(), "Field has no usable lattice");
        }
        self.field = Some(field);
        self.rebuild();
    }

    /// Replace the viewport. Rebuilds every particle.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.params = Self::params_for(&self.config, &viewport);
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.particles.clear();
        let Some(region) = self.spawn_region() else {
            return;
        };
        for _ in 0..self.config.particle_count {
            let particle = self.random_particle(&region);
            self.particles.push(particle);
        }
        debug!(
            particles = self.particles.len(),
            region = ?region,
            "Rebuilt particle set"
        );
    }

    fn random_particle(&mut self, region: &BoundingBox) -> Particle {
        let mut within = |min: f64, span: f64| {
            let t: f64 = self.rng.gen_range(SPAWN_MARGIN..(1.0 - SPAWN_MARGIN));
            min + span * t
        };
        let lon = within(region.min_lon, region.width());
        let lat = within(region.min_lat, region.height());
        let max_age = if self.config.max_age > self.config.min_age {
            self.rng.gen_range(self.config.min_age..=self.config.max_age)
        } else {
            self.config.max_age
        };
        Particle::spawn(lon, lat, max_age)
    }

    /// Advance every particle one step.
    pub fn tick(&mut self) -> Vec<TrailSegment> {
        let (Some(lookup), Some(bounds), Some(region)) =
            (self.lookup.as_ref(), self.field_bounds, self.spawn_region())
        else {
            return Vec::new();
        };

        let mut segments = Vec::with_capacity(self.particles.len());
        let mut respawn = Vec::new();

        for (idx, particle) in self.particles.iter_mut().enumerate() {
            if particle.needs_respawn() {
                respawn.push(idx);
                continue;
            }

            let step = advect(particle, lookup.sample(particle.lon, particle.lat), &self.params);
            apply(particle, &step, &self.params);

            if !bounds.contains_point(particle.lon, particle.lat) {
                particle.phase = ParticlePhase::OutOfBounds;
                continue;
            }

            if let AdvectionStep::Moved { from, to, speed } = step {
                segments.push(TrailSegment {
                    from: self.viewport.project(from.0, from.1),
                    to: self.viewport.project(to.0, to.1),
                    color: self.gradient.color_at(speed).with_opacity(particle.opacity()),
                    width: self.config.line_width,
                });
            }
        }

        for idx in respawn {
            let fresh = self.random_particle(&region);
            self.particles[idx] = fresh;
        }

        segments
    }
}
