//! Synthetic wind fields, the last-resort fallback.
//!
//! The field is a prevailing flow plus smooth positional variation, a weak
//! cyclonic swirl around the box centre and a little random jitter. Without a
//! configured base flow the prevailing wind follows the South Asian monsoon
//! calendar: south-westerly May to September, north-easterly November to
//! February, light and variable in between.

use std::f64::consts::PI;
use std::sync::Mutex;

use chrono::{DateTime, Datelike, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};
use wind_common::{BoundingBox, WindField, WindPoint, WindSource};
use wind_grid::{assemble_field, coarsen_resolution, generate_grid};

use crate::config::SyntheticConfig;

/// Peak swirl speed at the centre (m/s).
const SWIRL_STRENGTH: f64 = 2.0;
/// e-folding distance of the swirl (degrees).
const SWIRL_RADIUS_DEG: f64 = 3.0;
/// Amplitude of the positional sine/cosine perturbation (m/s).
const WAVE_AMPLITUDE: f64 = 2.0;
/// Speeds below this are nudged so the field is never entirely calm.
const MIN_SPEED: f64 = 0.1;
/// Largest accepted jitter half-width (m/s).
const MAX_JITTER: f64 = 10.0;

/// Generator for `mock` fields.
pub struct SyntheticGenerator {
    config: SyntheticConfig,
    max_points: usize,
    rng: Mutex<StdRng>,
}

impl SyntheticGenerator {
    /// Jitter that is negative or not finite becomes 0, and anything above
    /// [`MAX_JITTER`] is clamped to it.
    pub fn new(mut config: SyntheticConfig, max_points: usize) -> Self {
        let jitter = sanitize_jitter(config.jitter);
        if jitter.to_bits() != config.jitter.to_bits() {
            warn!(configured = config.jitter, using = jitter, "Synthetic jitter out of range");
            config.jitter = jitter;
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            max_points,
            rng: Mutex::new(rng),
        }
    }

    pub fn jitter(&self) -> f64 {
        self.config.jitter
    }

    /// Prevailing (u, v) for a time.
    pub fn base_flow(&self, time: DateTime<Utc>) -> (f64, f64) {
        if let (Some(dir), Some(speed)) = (self.config.base_direction_deg, self.config.base_speed) {
            let rad = dir.to_radians();
            return (-speed * rad.sin(), -speed * rad.cos());
        }
        seasonal_flow(time.month())
    }

    /// Build a field covering `bbox`. Always contains at least one point.
    pub fn generate(&self, bbox: &BoundingBox, time: DateTime<Utc>, resolution_km: f64) -> WindField {
        let resolution_km = coarsen_resolution(bbox, resolution_km, self.max_points);
        let nodes = generate_grid(bbox, resolution_km);
        let (base_u, base_v) = self.base_flow(time);
        let (cx, cy) = bbox.center();

        // Phase advances through the day so successive hours differ
        let phase = time.hour() as f64;
        let time_factor = 1.0 + 0.2 * (phase * PI / 12.0).sin();

        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let points: Vec<WindPoint> = nodes
            .iter()
            .map(|node| {
                let dx = node.lon - cx;
                let dy = node.lat - cy;
                let r = (dx * dx + dy * dy).sqrt();
                let swirl = SWIRL_STRENGTH * (-r / SWIRL_RADIUS_DEG).exp();

                let mut u = base_u
                    + -dy * swirl / (r + 0.1)
                    + (node.lon * 0.5 + phase * 0.1).sin() * WAVE_AMPLITUDE;
                let mut v = base_v
                    + dx * swirl / (r + 0.1)
                    + (node.lat * 0.5 + phase * 0.1).cos() * WAVE_AMPLITUDE;

                if self.config.jitter > 0.0 {
                    u += rng.gen_range(-self.config.jitter..=self.config.jitter);
                    v += rng.gen_range(-self.config.jitter..=self.config.jitter);
                }

                u *= time_factor;
                v *= time_factor;
                if (u * u + v * v).sqrt() < MIN_SPEED {
                    u = MIN_SPEED;
                }

                WindPoint::from_components(node.lat, node.lon, u, v, time, WindSource::Mock)
            })
            .collect();
        drop(rng);

        debug!(
            points = points.len(),
            resolution_km = resolution_km,
            base_u = base_u,
            base_v = base_v,
            "Generated synthetic wind field"
        );

        assemble_field(WindSource::Mock, time, *bbox, resolution_km, points)
    }
}

fn sanitize_jitter(jitter: f64) -> f64 {
    if jitter.is_finite() && jitter > 0.0 {
        jitter.min(MAX_JITTER)
    } else {
        0.0
    }
}

/// Monsoon-driven prevailing wind for a month (1-12).
pub fn seasonal_flow(month: u32) -> (f64, f64) {
    match month {
        // South-west monsoon
        5..=9 => (5.0, 3.0),
        // North-east monsoon
        11 | 12 | 1 | 2 => (-4.0, -4.0),
        // Inter-monsoon: the positional waves dominate
        _ => (0.0, 0.0),
    }
}
