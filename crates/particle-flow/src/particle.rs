//! Particle state.

use serde::Serialize;

/// Life-cycle of a particle.
///
/// `Spawned -> Advecting -> (Expired | OutOfBounds) -> Spawned`. Expired and
/// out-of-bounds particles are respawned on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticlePhase {
    Spawned,
    Advecting,
    Expired,
    OutOfBounds,
}

/// A tracer moving through the field, in geographic coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub lon: f64,
    pub lat: f64,
    /// Ticks lived. Stalled ticks count extra.
    pub age: u32,
    pub max_age: u32,
    /// Speed sampled on the last move (m/s).
    pub speed: f64,
    pub phase: ParticlePhase,
}

impl Particle {
    pub fn spawn(lon: f64, lat: f64, max_age: u32) -> Self {
        Self {
            lon,
            lat,
            age: 0,
            max_age,
            speed: 0.0,
            phase: ParticlePhase::Spawned,
        }
    }

    /// Whether the next tick must respawn this particle.
    pub fn needs_respawn(&self) -> bool {
        self.age > self.max_age
            || matches!(self.phase, ParticlePhase::Expired | ParticlePhase::OutOfBounds)
    }

    /// Trail opacity for the current age.
    pub fn opacity(&self) -> f64 {
        trail_opacity(self.age, self.max_age)
    }
}

/// Fraction of life spent fading in.
pub const FADE_IN_FRACTION: f64 = 0.2;
/// Fraction of life spent fading out.
pub const FADE_OUT_FRACTION: f64 = 0.4;

/// Opacity (0-1) of a trail drawn at `age`: ramps up over the first 20 % of
/// life, holds, then ramps down over the last 40 %.
pub fn trail_opacity(age: u32, max_age: u32) -> f64 {
    if max_age == 0 {
        return 0.0;
    }
    let life = (age as f64 / max_age as f64).clamp(0.0, 1.0);

    if life < FADE_IN_FRACTION {
        life / FADE_IN_FRACTION
    } else if life > 1.0 - FADE_OUT_FRACTION {
        (1.0 - life) / FADE_OUT_FRACTION
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_opacity_ramps() {
        assert_eq!(trail_opacity(0, 100), 0.0);
        assert!((trail_opacity(10, 100) - 0.5).abs() < 1e-9);
        assert_eq!(trail_opacity(20, 100), 1.0);
        assert_eq!(trail_opacity(50, 100), 1.0);
        assert!((trail_opacity(80, 100) - 0.5).abs() < 1e-9);
        assert_eq!(trail_opacity(100, 100), 0.0);
        assert_eq!(trail_opacity(150, 100), 0.0);
    }

    #[test]
    fn test_zero_lifetime_is_invisible() {
        assert_eq!(trail_opacity(0, 0), 0.0);
    }

    #[test]
    fn test_needs_respawn() {
        let mut p = Particle::spawn(80.0, 7.0, 10);
        assert!(!p.needs_respawn());
        p.age = 11;
        assert!(p.needs_respawn());

        let mut q = Particle::spawn(80.0, 7.0, 10);
        q.phase = ParticlePhase::OutOfBounds;
        assert!(q.needs_respawn());
    }
}
