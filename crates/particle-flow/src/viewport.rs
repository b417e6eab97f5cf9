//! Geographic viewport mapped onto a pixel surface.

use serde::{Deserialize, Serialize};
use wind_common::BoundingBox;

/// Visible geographic bounds and the pixel size they are drawn at.
///
/// Projection is equirectangular: longitude maps linearly to x, latitude to
/// y with north at the top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub bounds: BoundingBox,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(bounds: BoundingBox, width: u32, height: u32) -> Self {
        Self {
            bounds,
            width,
            height,
        }
    }

    /// Pixel coordinates of a geographic point.
    pub fn project(&self, lon: f64, lat: f64) -> (f32, f32) {
        let x = (lon - self.bounds.min_lon) / self.bounds.width() * self.width as f64;
        let y = (self.bounds.max_lat - lat) / self.bounds.height() * self.height as f64;
        (x as f32, y as f32)
    }

    /// Geographic point under a pixel.
    pub fn unproject(&self, x: f32, y: f32) -> (f64, f64) {
        let lon = self.bounds.min_lon + x as f64 / self.width as f64 * self.bounds.width();
        let lat = self.bounds.max_lat - y as f64 / self.height as f64 * self.bounds.height();
        (lon, lat)
    }

    /// Degrees of longitude covered by one pixel.
    pub fn degrees_per_pixel(&self) -> f64 {
        if self.width == 0 {
            return 0.0;
        }
        self.bounds.width() / self.width as f64
    }

    /// The same viewport shifted by whole degrees, clamped to the globe.
    pub fn panned(&self, d_lon: f64, d_lat: f64) -> Self {
        let d_lon = d_lon
            .max(-180.0 - self.bounds.min_lon)
            .min(180.0 - self.bounds.max_lon);
        let d_lat = d_lat
            .max(-90.0 - self.bounds.min_lat)
            .min(90.0 - self.bounds.max_lat);
        Self {
            bounds: BoundingBox::new(
                self.bounds.min_lon + d_lon,
                self.bounds.min_lat + d_lat,
                self.bounds.max_lon + d_lon,
                self.bounds.max_lat + d_lat,
            ),
            ..*self
        }
    }
}
