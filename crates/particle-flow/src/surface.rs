//! Drawing surfaces for particle trails.
//!
//! Trails accumulate: every frame the surface is partially erased with
//! [`RenderSurface::fade`] before new segments are drawn, so older segments
//! dim away and the eye sees continuous flow lines.

use std::path::Path;

use tiny_skia::{
    BlendMode, Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

use crate::error::{RenderError, RenderResult};
use crate::simulator::TrailSegment;

/// Something trail segments can be drawn on.
pub trait RenderSurface {
    fn size(&self) -> (u32, u32);

    /// Erase `amount` (0-1) of every pixel's alpha.
    fn fade(&mut self, amount: f32);

    fn draw_segment(&mut self, segment: &TrailSegment);

    /// Erase everything.
    fn clear(&mut self);
}

/// Raster surface backed by a `tiny-skia` pixmap.
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })?;
        pixmap.fill(Color::TRANSPARENT);
        Ok(Self { pixmap })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight (non-premultiplied) RGBA at a pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Pixels with any coverage.
    pub fn painted_pixels(&self) -> usize {
        self.pixmap.pixels().iter().filter(|p| p.alpha() > 0).count()
    }

    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let png = self.encode_png()?;
        std::fs::write(path, png)?;
        Ok(())
    }
}

impl RenderSurface for PixmapSurface {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn fade(&mut self, amount: f32) {
        let amount = amount.clamp(0.0, 1.0);
        if amount <= 0.0 {
            return;
        }
        let Some(rect) = Rect::from_xywh(
            0.0,
            0.0,
            self.pixmap.width() as f32,
            self.pixmap.height() as f32,
        ) else {
            return;
        };

        // DestinationOut keeps dst * (1 - src_alpha)
        let mut paint = Paint::default();
        paint.set_color(Color::from_rgba(0.0, 0.0, 0.0, amount).unwrap_or(Color::BLACK));
        paint.blend_mode = BlendMode::DestinationOut;
        paint.anti_alias = false;

        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn draw_segment(&mut self, segment: &TrailSegment) {
        if segment.color.a == 0 {
            return;
        }

        let mut paint = Paint::default();
        let c = segment.color;
        paint.set_color_rgba8(c.r, c.g, c.b, c.a);
        paint.anti_alias = true;

        let mut stroke = Stroke::default();
        stroke.width = segment.width;
        stroke.line_cap = LineCap::Round;
        stroke.line_join = LineJoin::Round;

        let mut pb = PathBuilder::new();
        pb.move_to(segment.from.0, segment.from.1);
        pb.line_to(segment.to.0, segment.to.1);

        if let Some(path) = pb.finish() {
            self.pixmap
                .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::Rgba;

    fn segment(alpha: u8) -> TrailSegment {
        TrailSegment {
            from: (2.0, 10.0),
            to: (18.0, 10.0),
            color: Rgba::new(255, 0, 0, alpha),
            width: 2.0,
        }
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            PixmapSurface::new(0, 10),
            Err(RenderError::InvalidSize { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_draw_then_fade() {
        let mut surface = PixmapSurface::new(20, 20).unwrap();
        surface.draw_segment(&segment(255));
        let before = surface.pixel(10, 10).unwrap();
        assert!(before[3] > 200);
        assert_eq!(before[0], 255);

        surface.fade(0.5);
        let after = surface.pixel(10, 10).unwrap();
        assert!(after[3] < before[3]);
        assert!(after[3] > 0);

        surface.clear();
        assert_eq!(surface.painted_pixels(), 0);
    }

    #[test]
    fn test_transparent_segment_is_skipped() {
        let mut surface = PixmapSurface::new(20, 20).unwrap();
        surface.draw_segment(&segment(0));
        assert_eq!(surface.painted_pixels(), 0);
    }

    #[test]
    fn test_png_signature() {
        let surface = PixmapSurface::new(4, 4).unwrap();
        let png = surface.encode_png().unwrap();
        assert_eq!(&png[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
