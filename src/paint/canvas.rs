use crate::color::Rgba;

/// Gradient stop: offset in `0..=1` and colour.
pub type Stop = (f32, Rgba);

/// Colour at `t` along `stops` (sorted by offset). Ends are held.
pub fn sample_stops(stops: &[Stop], t: f32) -> Rgba {
    let Some(&(first_t, first)) = stops.first() else {
        return Rgba::new(0.0, 0.0, 0.0, 0.0);
    };
    if t <= first_t {
        return first;
    }
    for pair in stops.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let span = t1 - t0;
            let k = if span > 0.0 { (t - t0) / span } else { 1.0 };
            return Rgba::lerp(c0, c1, k);
        }
    }
    stops[stops.len() - 1].1
}

/// RGBA8 pixel buffer with source-over blending and an optional clip rect.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    data: Vec<u8>,
    clip: Option<(f32, f32, f32, f32)>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height * 4],
            clip: None,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Reallocate only when the size changes. Contents are undefined afterwards.
    pub fn ensure_size(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.data.resize(width * height * 4, 0);
        }
    }

    pub fn copy_from(&mut self, other: &Canvas) {
        self.ensure_size(other.width, other.height);
        self.data.copy_from_slice(&other.data);
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        let i = (y * self.width + x) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Rewrite colour channels in place; alpha is kept.
    pub fn map_rgb(&mut self, mut f: impl FnMut([u8; 3]) -> [u8; 3]) {
        for px in self.data.chunks_exact_mut(4) {
            let [r, g, b] = f([px[0], px[1], px[2]]);
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    }

    pub fn set_clip(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        self.clip = Some((x0, y0, x1, y1));
    }

    pub fn clear_clip(&mut self) {
        self.clip = None;
    }

    /// Overwrite every pixel, clip included.
    pub fn fill(&mut self, c: Rgba) {
        let [r, g, b] = c.to_u8();
        let a = (c.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[r, g, b, a]);
        }
    }

    pub fn fill_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, c: Rgba) {
        let Some((xs, ys)) = self.span(x0, y0, x1, y1) else {
            return;
        };
        for py in ys {
            for px in xs.clone() {
                self.blend(px, py, c, 1.0);
            }
        }
    }

    /// Vertical gradient laid out over `gy0..gy1`, painted inside the rect.
    pub fn fill_rect_vgradient(
        &mut self,
        rect: (f32, f32, f32, f32),
        gy0: f32,
        gy1: f32,
        stops: &[Stop],
    ) {
        let (x0, y0, x1, y1) = rect;
        let Some((xs, ys)) = self.span(x0, y0, x1, y1) else {
            return;
        };
        let span = (gy1 - gy0).max(f32::EPSILON);
        for py in ys {
            let c = sample_stops(stops, (py as f32 + 0.5 - gy0) / span);
            for px in xs.clone() {
                self.blend(px, py, c, 1.0);
            }
        }
    }

    /// Horizontal counterpart of `fill_rect_vgradient`.
    pub fn fill_rect_hgradient(
        &mut self,
        rect: (f32, f32, f32, f32),
        gx0: f32,
        gx1: f32,
        stops: &[Stop],
    ) {
        let (x0, y0, x1, y1) = rect;
        let Some((xs, ys)) = self.span(x0, y0, x1, y1) else {
            return;
        };
        let span = (gx1 - gx0).max(f32::EPSILON);
        for px in xs {
            let c = sample_stops(stops, (px as f32 + 0.5 - gx0) / span);
            for py in ys.clone() {
                self.blend(px, py, c, 1.0);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, c: Rgba) {
        self.fill_radial_gradient_circle(cx, cy, r, &[(0.0, c)]);
    }

    /// Disc whose colour follows `stops` from the centre (0) to the rim (1).
    pub fn fill_radial_gradient_circle(&mut self, cx: f32, cy: f32, r: f32, stops: &[Stop]) {
        if r <= 0.0 {
            return;
        }
        let Some((xs, ys)) = self.span(cx - r - 1.0, cy - r - 1.0, cx + r + 1.0, cy + r + 1.0) else {
            return;
        };
        for py in ys {
            let dy = py as f32 + 0.5 - cy;
            for px in xs.clone() {
                let dx = px as f32 + 0.5 - cx;
                let d = (dx * dx + dy * dy).sqrt();
                let coverage = (r - d + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(px, py, sample_stops(stops, d / r), coverage);
                }
            }
        }
    }

    pub fn stroke_circle(&mut self, cx: f32, cy: f32, r: f32, width: f32, c: Rgba) {
        let half = (width * 0.5).max(0.5);
        let outer = r + half + 1.0;
        let Some((xs, ys)) = self.span(cx - outer, cy - outer, cx + outer, cy + outer) else {
            return;
        };
        for py in ys {
            let dy = py as f32 + 0.5 - cy;
            for px in xs.clone() {
                let dx = px as f32 + 0.5 - cx;
                let d = (dx * dx + dy * dy).sqrt();
                let coverage = (half - (d - r).abs() + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(px, py, c, coverage);
                }
            }
        }
    }

    /// Lower half of an axis-aligned ellipse centred on `(cx, cy)`.
    pub fn fill_half_ellipse_down(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, c: Rgba) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let Some((xs, ys)) = self.span(cx - rx - 1.0, cy, cx + rx + 1.0, cy + ry + 1.0) else {
            return;
        };
        let edge = rx.min(ry);
        for py in ys {
            let ny = (py as f32 + 0.5 - cy) / ry;
            for px in xs.clone() {
                let nx = (px as f32 + 0.5 - cx) / rx;
                let d = (nx * nx + ny * ny).sqrt();
                let coverage = ((1.0 - d) * edge + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(px, py, c, coverage);
                }
            }
        }
    }

    /// Pixel index ranges whose centres fall in the rect, after clipping.
    fn span(
        &self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
    ) -> Option<(std::ops::Range<usize>, std::ops::Range<usize>)> {
        let (mut x0, mut y0, mut x1, mut y1) = (x0, y0, x1, y1);
        if let Some((cx0, cy0, cx1, cy1)) = self.clip {
            x0 = x0.max(cx0);
            y0 = y0.max(cy0);
            x1 = x1.min(cx1);
            y1 = y1.min(cy1);
        }
        let to_index = |v: f32, max: usize| (v - 0.5).ceil().clamp(0.0, max as f32) as usize;
        let xs = to_index(x0, self.width)..to_index(x1, self.width);
        let ys = to_index(y0, self.height)..to_index(y1, self.height);
        if xs.is_empty() || ys.is_empty() {
            None
        } else {
            Some((xs, ys))
        }
    }

    fn blend(&mut self, x: usize, y: usize, c: Rgba, coverage: f32) {
        let a = (c.a * coverage).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let i = (y * self.width + x) * 4;
        let px = &mut self.data[i..i + 4];
        let inv = 1.0 - a;
        let mix = |dst: u8, src: f32| (dst as f32 * inv + src.clamp(0.0, 255.0) * a).round() as u8;
        px[0] = mix(px[0], c.r);
        px[1] = mix(px[1], c.g);
        px[2] = mix(px[2], c.b);
        px[3] = (px[3] as f32 * inv + 255.0 * a).round() as u8;
    }
}
