use crate::color::Hsla;
use crate::config::LampConfig;
use crate::sim::{random_hue_near, RandomSource, FLOOR_FRACTION};
use std::f32::consts::TAU;

/// Blobs farther than this from a primary activation are untouched.
pub const IMPULSE_RADIUS: f32 = 100.0;

const WALL_BOUNCE: f32 = 0.8;
const FLOOR_BOUNCE: f32 = 0.8;
const DRAG_X: f32 = 0.99;
const DRAG_Y: f32 = 0.98;
const PERTURB_CHANCE: f32 = 0.01;
const PERTURB_KICK: f32 = 0.5;
const MORPH_RATE: f32 = 0.08;
const MORPH_SNAP: f32 = 0.05;

/// In-flight radius change. Original and target always travel together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusMorph {
    pub original: f32,
    pub target: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Blob {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub speed_x: f32,
    pub speed_y: f32,
    pub phase: f32,
    pub amplitude: f32,
    pub color: Hsla,
    pub morph: Option<RadiusMorph>,
}

impl Blob {
    pub fn new(x: f32, y: f32, radius: f32, color: Hsla) -> Self {
        Self {
            x,
            y,
            radius,
            speed_x: 0.0,
            speed_y: 0.0,
            phase: 0.0,
            amplitude: 0.0,
            color,
            morph: None,
        }
    }

    pub fn with_speed(mut self, speed_x: f32, speed_y: f32) -> Self {
        self.speed_x = speed_x;
        self.speed_y = speed_y;
        self
    }

    fn advance_morph(&mut self, frames: f32) {
        let Some(m) = self.morph else {
            return;
        };
        let diff = m.target - self.radius;
        if diff.abs() <= MORPH_SNAP {
            self.radius = m.target;
            self.morph = None;
        } else {
            self.radius += diff * (MORPH_RATE * frames).min(1.0);
        }
    }
}

/// Owns every blob for the whole session; blobs are never added or removed.
#[derive(Clone, Debug)]
pub struct BlobField {
    blobs: Vec<Blob>,
    width: f32,
    height: f32,
}

impl BlobField {
    pub fn new(cfg: &LampConfig, rng: &mut impl RandomSource) -> Self {
        let floor_y = cfg.floor_y();
        let mut blobs = Vec::with_capacity(cfg.blob_count);
        for _ in 0..cfg.blob_count {
            let radius = rng.range(cfg.min_radius, cfg.max_radius);
            let x = rng.range(radius, (cfg.width - radius).max(radius));
            // Start in the lower half of the liquid, heading up.
            let lowest = (floor_y - radius).max(radius);
            let y = (lowest - rng.unit() * cfg.height * 0.5).clamp(radius, lowest);
            let speed_x = rng.unit() - 0.5;
            let speed_y = -0.3 - rng.unit() * 0.7;
            let phase = rng.unit() * TAU;
            let amplitude = 0.2 + rng.unit() * 0.8;
            let color = random_hue_near(cfg.base_hue, cfg.hue_variance, cfg.blob_alpha, rng);
            blobs.push(Blob {
                x,
                y,
                radius,
                speed_x,
                speed_y,
                phase,
                amplitude,
                color,
                morph: None,
            });
        }
        Self {
            blobs,
            width: cfg.width,
            height: cfg.height,
        }
    }

    pub fn from_blobs(blobs: Vec<Blob>, width: f32, height: f32) -> Self {
        Self {
            blobs,
            width,
            height,
        }
    }

    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn floor_y(&self) -> f32 {
        self.height * FLOOR_FRACTION
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.blobs
            .iter()
            .map(|b| b.speed_x * b.speed_x + b.speed_y * b.speed_y)
            .sum()
    }

    /// One integration step. Frames longer than `cfg.max_dt` are dropped
    /// whole: nothing moves and no randomness is consumed.
    pub fn step(&mut self, dt: f32, cfg: &LampConfig, rng: &mut impl RandomSource) -> bool {
        if !dt.is_finite() || dt < 0.0 || dt > cfg.max_dt {
            return false;
        }

        // Velocities are tuned per 60 fps frame.
        let frames = dt * 60.0;
        let floor_y = self.floor_y();
        let mid_y = self.height * 0.5;
        let width = self.width;

        for b in &mut self.blobs {
            b.advance_morph(frames);

            b.phase = (b.phase + dt * 2.0) % TAU;
            let wave_x = b.phase.sin() * b.amplitude * 2.0;
            b.x += (b.speed_x + wave_x) * frames;
            b.y += b.speed_y * frames;

            if b.x < b.radius {
                b.x = b.radius;
                b.speed_x = b.speed_x.abs() * WALL_BOUNCE;
            }
            if b.x > width - b.radius {
                b.x = width - b.radius;
                b.speed_x = -b.speed_x.abs() * WALL_BOUNCE;
            }

            // Ceiling mostly absorbs so blobs sink back; the floor stays lively.
            if b.y < b.radius {
                b.y = b.radius;
                b.speed_y = b.speed_y.abs() * cfg.ceiling_bounce;
            }
            if b.y > floor_y - b.radius {
                b.y = floor_y - b.radius;
                b.speed_y = -b.speed_y.abs() * FLOOR_BOUNCE;
            }

            b.speed_x *= DRAG_X;
            b.speed_y *= DRAG_Y;
            b.speed_y += cfg.gravity * frames;

            if rng.unit() < PERTURB_CHANCE {
                b.speed_x += (rng.unit() - 0.5) * PERTURB_KICK;
                if b.y > mid_y {
                    b.speed_y -= rng.unit() * PERTURB_KICK;
                }
            }
        }
        true
    }

    /// Push blobs away from `(x, y)`, strongest at the centre and zero at
    /// `IMPULSE_RADIUS`; touched blobs get a fresh colour near `hue`.
    pub fn impulse_at(
        &mut self,
        x: f32,
        y: f32,
        hue: f32,
        cfg: &LampConfig,
        rng: &mut impl RandomSource,
    ) -> usize {
        let mut touched = 0usize;
        for b in &mut self.blobs {
            let dx = b.x - x;
            let dy = b.y - y;
            let distance = (dx * dx + dy * dy).sqrt();
            let impact = (1.0 - distance / IMPULSE_RADIUS).max(0.0);
            if impact <= 0.0 {
                continue;
            }
            if distance > f32::EPSILON {
                b.speed_x += dx / distance * impact * cfg.impulse_strength;
                b.speed_y += dy / distance * impact * cfg.impulse_strength;
            }
            b.color = random_hue_near(hue, cfg.click_hue_variance, cfg.blob_alpha, rng);
            touched += 1;
        }
        touched
    }

    /// Everything shoots upward in an independent random colour.
    pub fn burst(&mut self, cfg: &LampConfig, rng: &mut impl RandomSource) {
        for b in &mut self.blobs {
            b.speed_y = -cfg.burst_strength - rng.unit() * 2.0;
            b.speed_x = (rng.unit() - 0.5) * 3.0;
            let hue = rng.unit() * 360.0;
            b.color = random_hue_near(hue, cfg.hue_variance, cfg.blob_alpha, rng);
        }
    }

    pub fn stir(&mut self, rng: &mut impl RandomSource) {
        for b in &mut self.blobs {
            b.speed_y -= rng.unit() * 0.8;
            b.speed_x += rng.unit() - 0.5;
        }
    }

    pub fn jostle(&mut self, rng: &mut impl RandomSource) {
        for b in &mut self.blobs {
            b.speed_x += (rng.unit() - 0.5) * 0.1;
        }
    }

    pub fn click_wobble(&mut self, rng: &mut impl RandomSource) {
        for b in &mut self.blobs {
            b.speed_y -= rng.unit() * 0.5;
        }
    }

    /// Start a radius morph on every blob toward 80%..120% of its size.
    pub fn begin_morph(&mut self, cfg: &LampConfig, rng: &mut impl RandomSource) {
        for b in &mut self.blobs {
            let target = (b.radius * (0.8 + rng.unit() * 0.4)).clamp(cfg.min_radius, cfg.max_radius);
            b.morph = Some(RadiusMorph {
                original: b.radius,
                target,
            });
        }
    }

    /// Drop every blob onto the liquid floor.
    pub fn settle(&mut self) {
        let floor_y = self.floor_y();
        for b in &mut self.blobs {
            b.y = (floor_y - b.radius).max(b.radius);
        }
    }

    pub fn rise(&mut self, rng: &mut impl RandomSource) {
        for b in &mut self.blobs {
            b.speed_y = -1.0 - rng.unit();
        }
    }

    pub fn recolor_some(
        &mut self,
        fraction: f32,
        hue: f32,
        variance: f32,
        alpha: f32,
        rng: &mut impl RandomSource,
    ) -> usize {
        let n = self.blobs.len();
        if n == 0 {
            return 0;
        }
        let count = (n as f32 * fraction.clamp(0.0, 1.0)).floor() as usize;
        for _ in 0..count {
            let idx = ((rng.unit() * n as f32) as usize).min(n - 1);
            self.blobs[idx].color = random_hue_near(hue, variance, alpha, rng);
        }
        count
    }
}
