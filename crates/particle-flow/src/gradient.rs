//! Speed-to-colour gradient for particle trails.

use serde::{Deserialize, Serialize};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Same colour with alpha scaled by `opacity` (0-1).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let opacity = opacity.clamp(0.0, 1.0);
        Self {
            a: (self.a as f64 * opacity).round() as u8,
            ..self
        }
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Rgba, color2: Rgba, t: f64) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| ((a as f64 * t_inv) + (b as f64 * t)).round() as u8;

    Rgba::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// A piecewise-linear gradient over wind speed (m/s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedGradient {
    stops: Vec<(f64, Rgba)>,
}

impl SpeedGradient {
    /// Builds a gradient from `(speed, colour)` stops. Stops are sorted by
    /// speed; non-finite speeds are dropped. Returns `None` without stops.
    pub fn new(stops: impl IntoIterator<Item = (f64, Rgba)>) -> Option<Self> {
        let mut stops: Vec<_> = stops.into_iter().filter(|(s, _)| s.is_finite()).collect();
        if stops.is_empty() {
            return None;
        }
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        Some(Self { stops })
    }

    /// Wind speed scale:
    /// - 0 m/s: calm (light gray)
    /// - 5 m/s: light breeze (light cyan)
    /// - 10 m/s: moderate (yellow)
    /// - 15 m/s: fresh gale (orange)
    /// - 20 m/s: strong (dark red)
    pub fn wind() -> Self {
        Self {
            stops: vec![
                (0.0, Rgba::new(200, 200, 200, 255)),
                (5.0, Rgba::new(0, 200, 255, 255)),
                (10.0, Rgba::new(255, 255, 0, 255)),
                (15.0, Rgba::new(255, 165, 0, 255)),
                (20.0, Rgba::new(139, 0, 0, 255)),
            ],
        }
    }

    pub fn stops(&self) -> &[(f64, Rgba)] {
        &self.stops
    }

    /// Colour for a speed, clamped to the end stops.
    pub fn color_at(&self, speed: f64) -> Rgba {
        let (first_speed, first) = self.stops[0];
        let (last_speed, last) = self.stops[self.stops.len() - 1];

        if !(speed > first_speed) {
            return first;
        }
        if speed >= last_speed {
            return last;
        }

        for pair in self.stops.windows(2) {
            let (lo_speed, lo) = pair[0];
            let (hi_speed, hi) = pair[1];
            if speed <= hi_speed {
                let span = hi_speed - lo_speed;
                let t = if span > 0.0 { (speed - lo_speed) / span } else { 1.0 };
                return interpolate_color(lo, hi, t);
            }
        }
        last
    }
}

impl Default for SpeedGradient {
    fn default() -> Self {
        Self::wind()
    }
}
