//! Cache configuration.

use serde::{Deserialize, Serialize};

/// Tunables for [`FieldCache`](crate::FieldCache).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of fields held at once.
    pub capacity: usize,
    /// Seconds an entry stays valid after insertion.
    pub ttl_secs: u64,
    /// Bounding boxes are snapped outward to multiples of this (degrees).
    pub snap_grid_deg: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            ttl_secs: 30 * 60,
            snap_grid_deg: 0.5,
        }
    }
}
