use crate::color::Rgba;
use crate::config::LampConfig;
use crate::paint::{Canvas, Painter, Viewport};
use crate::sim::Scene;

const BASE_TOP: Rgba = Rgba::new(80.0, 20.0, 100.0, 0.6);
const BASE_BOTTOM: Rgba = Rgba::new(30.0, 10.0, 40.0, 0.8);
const BLOB_RIM: Rgba = Rgba::new(20.0, 10.0, 30.0, 0.1);
const CAP: Rgba = Rgba::new(40.0, 20.0, 60.0, 0.9);
const HIGHLIGHT_ALPHA: f32 = 0.3;
const CAP_DEPTH: f32 = 0.08;
const RIPPLE_STROKE: f32 = 2.0;

/// Full animated lamp: background, base, blobs, glass, cap, ripples.
#[derive(Debug, Clone)]
pub struct RasterPainter {
    background: Rgba,
    backdrop: Rgba,
    glass_scale: f32,
}

impl RasterPainter {
    pub fn new(cfg: &LampConfig) -> Self {
        Self {
            background: cfg.background,
            backdrop: cfg.backdrop,
            glass_scale: cfg.glass_opacity / 0.1,
        }
    }

    /// Everything except ripples. Shared with the static painter.
    pub(crate) fn paint_body(&self, scene: &Scene<'_>, canvas: &mut Canvas) -> Viewport {
        canvas.clear_clip();
        canvas.fill(self.backdrop.with_alpha(1.0));
        let vp = Viewport::for_scene(scene, canvas.width(), canvas.height());
        let (x0, y0, x1, y1) = vp.lamp_rect();
        canvas.set_clip(x0, y0, x1, y1);

        let (w, h) = (scene.width, scene.height);
        canvas.fill_rect(x0, y0, x1, y1, self.background);

        // Base: gradient spans 0.7h..h but only the band below the floor is filled.
        let (_, base_top) = vp.to_canvas(0.0, scene.floor_y());
        let (_, grad_top) = vp.to_canvas(0.0, h * 0.7);
        let (_, bottom) = vp.to_canvas(0.0, h);
        canvas.fill_rect_vgradient(
            (x0, base_top, x1, bottom),
            grad_top,
            bottom,
            &[(0.0, BASE_TOP), (1.0, BASE_BOTTOM)],
        );

        for blob in scene.blobs {
            let (cx, cy) = vp.to_canvas(blob.x, blob.y);
            let r = vp.scale_len(blob.radius);
            let rgba = blob.color.to_rgba();
            canvas.fill_radial_gradient_circle(
                cx,
                cy,
                r,
                &[(0.0, rgba.with_alpha(1.0)), (0.7, rgba), (1.0, BLOB_RIM)],
            );
            let (hx, hy) = vp.to_canvas(blob.x - blob.radius * 0.3, blob.y - blob.radius * 0.3);
            canvas.fill_circle(hx, hy, r * 0.2, Rgba::white(HIGHLIGHT_ALPHA));
        }

        let k = self.glass_scale;
        let (gx0, _) = vp.to_canvas(w * 0.1, 0.0);
        let (gx1, _) = vp.to_canvas(w * 0.3, 0.0);
        let (_, top) = vp.to_canvas(0.0, 0.0);
        canvas.fill_rect_hgradient(
            (gx0, top, gx1, bottom),
            x0,
            x1,
            &[
                (0.0, Rgba::white(0.1 * k)),
                (0.5, Rgba::white(0.05 * k)),
                (1.0, Rgba::white(0.15 * k)),
            ],
        );

        let (cap_x, cap_y) = vp.to_canvas(w * 0.5, 0.0);
        canvas.fill_half_ellipse_down(
            cap_x,
            cap_y,
            vp.scale_len(w * 0.5),
            vp.scale_len(h * CAP_DEPTH),
            CAP,
        );
        vp
    }
}

impl Painter for RasterPainter {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn animated(&self) -> bool {
        true
    }

    fn paint(&mut self, scene: &Scene<'_>, canvas: &mut Canvas) {
        if canvas.width() == 0 || canvas.height() == 0 {
            return;
        }
        let vp = self.paint_body(scene, canvas);
        for ripple in scene.ripples {
            let (cx, cy) = vp.to_canvas(ripple.x, ripple.y);
            canvas.stroke_circle(
                cx,
                cy,
                vp.scale_len(ripple.radius),
                vp.scale_len(RIPPLE_STROKE),
                Rgba::white(ripple.opacity.clamp(0.0, 1.0)),
            );
        }
        canvas.clear_clip();
    }
}
