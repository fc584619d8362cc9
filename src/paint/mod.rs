pub mod canvas;
pub mod fallback;
pub mod raster;

pub use canvas::{sample_stops, Canvas, Stop};
pub use fallback::StaticPainter;
pub use raster::RasterPainter;

use crate::config::LampConfig;
use crate::sim::Scene;

/// Scene to pixels. Painters read the scene and never touch simulation state.
pub trait Painter {
    fn name(&self) -> &'static str;
    /// False when the output ignores blob and ripple motion.
    fn animated(&self) -> bool;
    fn paint(&mut self, scene: &Scene<'_>, canvas: &mut Canvas);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PainterKind {
    Raster,
    Static,
}

impl PainterKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Raster => "raster",
            Self::Static => "static",
        }
    }
}

pub fn make_painter(kind: PainterKind, cfg: &LampConfig) -> Box<dyn Painter> {
    match kind {
        PainterKind::Raster => Box::new(RasterPainter::new(cfg)),
        PainterKind::Static => Box::new(StaticPainter::new(cfg)),
    }
}

/// Uniform lamp-to-canvas mapping, centred, for one vertical band of the lamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// Lamp y shown at the top edge of the lamp rect.
    pub band_top: f32,
    pub lamp_width: f32,
    pub band_height: f32,
}

impl Viewport {
    pub fn fit(
        lamp_width: f32,
        band_top: f32,
        band_bottom: f32,
        canvas_width: usize,
        canvas_height: usize,
    ) -> Self {
        let band_height = (band_bottom - band_top).max(f32::EPSILON);
        let lamp_width = lamp_width.max(f32::EPSILON);
        let cw = canvas_width as f32;
        let ch = canvas_height as f32;
        let scale = (cw / lamp_width).min(ch / band_height).max(0.0);
        Self {
            scale,
            offset_x: (cw - lamp_width * scale) * 0.5,
            offset_y: (ch - band_height * scale) * 0.5,
            band_top,
            lamp_width,
            band_height,
        }
    }

    pub fn for_scene(scene: &Scene<'_>, canvas_width: usize, canvas_height: usize) -> Self {
        let (top, bottom) = scene.visible_band();
        Self::fit(scene.width, top, bottom, canvas_width, canvas_height)
    }

    pub fn to_canvas(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.offset_x + x * self.scale,
            self.offset_y + (y - self.band_top) * self.scale,
        )
    }

    pub fn scale_len(&self, units: f32) -> f32 {
        units * self.scale
    }

    /// Inverse of `to_canvas`; `None` outside the visible lamp.
    pub fn to_lamp(&self, px: f32, py: f32) -> Option<(f32, f32)> {
        if self.scale <= 0.0 {
            return None;
        }
        let x = (px - self.offset_x) / self.scale;
        let y = (py - self.offset_y) / self.scale;
        if !(0.0..=self.lamp_width).contains(&x) || !(0.0..=self.band_height).contains(&y) {
            return None;
        }
        Some((x, y + self.band_top))
    }

    /// Visible lamp area in canvas pixels: `(x0, y0, x1, y1)`.
    pub fn lamp_rect(&self) -> (f32, f32, f32, f32) {
        (
            self.offset_x,
            self.offset_y,
            self.offset_x + self.lamp_width * self.scale,
            self.offset_y + self.band_height * self.scale,
        )
    }
}
