//! Beaufort wind force scale, used for legend display.

use serde::Serialize;

/// One row of the Beaufort scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaufortLevel {
    pub force: u8,
    pub description: &'static str,
    /// Inclusive lower bound (m/s)
    pub min_ms: f64,
    /// Exclusive upper bound (m/s); `None` for hurricane force
    pub max_ms: Option<f64>,
}

/// The standard 13-level scale (WMO, 10 m wind).
pub const BEAUFORT_SCALE: [BeaufortLevel; 13] = [
    BeaufortLevel { force: 0, description: "Calm", min_ms: 0.0, max_ms: Some(0.5) },
    BeaufortLevel { force: 1, description: "Light air", min_ms: 0.5, max_ms: Some(1.6) },
    BeaufortLevel { force: 2, description: "Light breeze", min_ms: 1.6, max_ms: Some(3.4) },
    BeaufortLevel { force: 3, description: "Gentle breeze", min_ms: 3.4, max_ms: Some(5.5) },
    BeaufortLevel { force: 4, description: "Moderate breeze", min_ms: 5.5, max_ms: Some(8.0) },
    BeaufortLevel { force: 5, description: "Fresh breeze", min_ms: 8.0, max_ms: Some(10.8) },
    BeaufortLevel { force: 6, description: "Strong breeze", min_ms: 10.8, max_ms: Some(13.9) },
    BeaufortLevel { force: 7, description: "Near gale", min_ms: 13.9, max_ms: Some(17.2) },
    BeaufortLevel { force: 8, description: "Gale", min_ms: 17.2, max_ms: Some(20.8) },
    BeaufortLevel { force: 9, description: "Strong gale", min_ms: 20.8, max_ms: Some(24.5) },
    BeaufortLevel { force: 10, description: "Storm", min_ms: 24.5, max_ms: Some(28.5) },
    BeaufortLevel { force: 11, description: "Violent storm", min_ms: 28.5, max_ms: Some(32.7) },
    BeaufortLevel { force: 12, description: "Hurricane force", min_ms: 32.7, max_ms: None },
];

/// Beaufort level for a wind speed in m/s. Negative and NaN speeds count as calm.
pub fn beaufort_force(speed_ms: f64) -> &'static BeaufortLevel {
    BEAUFORT_SCALE
        .iter()
        .rev()
        .find(|level| speed_ms >= level.min_ms)
        .unwrap_or(&BEAUFORT_SCALE[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_is_contiguous() {
        for pair in BEAUFORT_SCALE.windows(2) {
            assert_eq!(pair[0].max_ms, Some(pair[1].min_ms));
        }
    }

    #[test]
    fn test_force_lookup() {
        assert_eq!(beaufort_force(0.0).force, 0);
        assert_eq!(beaufort_force(5.5).force, 4);
        assert_eq!(beaufort_force(12.0).force, 6);
        assert_eq!(beaufort_force(50.0).force, 12);
        assert_eq!(beaufort_force(-1.0).force, 0);
        assert_eq!(beaufort_force(f64::NAN).force, 0);
    }
}
