use crate::color::Hsla;
use crate::config::LampConfig;
use crate::paint::{Canvas, Painter, RasterPainter};
use crate::sim::{Blob, Scene};

/// Fixed arrangement as fractions of (width, height, max radius), plus hue.
const LAYOUT: [(f32, f32, f32, f32); 5] = [
    (0.30, 0.22, 0.70, 250.0),
    (0.68, 0.38, 0.90, 280.0),
    (0.40, 0.55, 0.60, 220.0),
    (0.62, 0.70, 1.00, 300.0),
    (0.28, 0.74, 0.75, 200.0),
];

/// Still image for terminals without truecolor. Rendered once per canvas
/// size and quantized to the 6x6x6 colour cube so 256-colour terminals show
/// it without banding surprises.
pub struct StaticPainter {
    body: RasterPainter,
    blobs_for: Option<(u32, u32)>,
    blobs: Vec<Blob>,
    cache: Option<CachedImage>,
}

struct CachedImage {
    width: usize,
    height: usize,
    minimized: bool,
    canvas: Canvas,
}

impl StaticPainter {
    pub fn new(cfg: &LampConfig) -> Self {
        Self {
            body: RasterPainter::new(cfg),
            blobs_for: None,
            blobs: Vec::new(),
            cache: None,
        }
    }

    fn layout(&mut self, width: f32, height: f32) -> &[Blob] {
        let key = (width.to_bits(), height.to_bits());
        if self.blobs_for != Some(key) {
            let floor = height * crate::sim::FLOOR_FRACTION;
            let max_r = (width * 0.2).min(floor * 0.2);
            self.blobs = LAYOUT
                .iter()
                .map(|&(fx, fy, fr, hue)| {
                    let r = (max_r * fr).max(1.0);
                    let x = (width * fx).clamp(r, (width - r).max(r));
                    let y = (floor * fy).clamp(r, (floor - r).max(r));
                    Blob::new(x, y, r, Hsla::new(hue, 80.0, 60.0, 0.8))
                })
                .collect();
            self.blobs_for = Some(key);
        }
        &self.blobs
    }
}

impl Painter for StaticPainter {
    fn name(&self) -> &'static str {
        "static"
    }

    fn animated(&self) -> bool {
        false
    }

    fn paint(&mut self, scene: &Scene<'_>, canvas: &mut Canvas) {
        let (w, h) = (canvas.width(), canvas.height());
        if w == 0 || h == 0 {
            return;
        }
        let fresh = self
            .cache
            .as_ref()
            .is_some_and(|c| c.width == w && c.height == h && c.minimized == scene.minimized);
        if !fresh {
            let mut image = Canvas::new(w, h);
            let blobs = self.layout(scene.width, scene.height).to_vec();
            let fixed = Scene {
                blobs: &blobs,
                ripples: &[],
                hue: 240.0,
                ..*scene
            };
            self.body.paint_body(&fixed, &mut image);
            image.clear_clip();
            quantize_cube(&mut image);
            self.cache = Some(CachedImage {
                width: w,
                height: h,
                minimized: scene.minimized,
                canvas: image,
            });
        }
        if let Some(cached) = &self.cache {
            canvas.copy_from(&cached.canvas);
        }
    }
}

fn quantize_cube(canvas: &mut Canvas) {
    let q = |v: u8| ((v as f32 / 51.0).round() * 51.0) as u8;
    canvas.map_rgb(|[r, g, b]| [q(r), q(g), q(b)]);
}
