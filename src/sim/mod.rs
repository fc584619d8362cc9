mod effects;
mod field;
mod hue;

pub use effects::{EffectLayer, Ripple, RIPPLE_FADE, RIPPLE_GROWTH, RIPPLE_START_OPACITY, RIPPLE_START_RADIUS};
pub use field::{Blob, BlobField, RadiusMorph, IMPULSE_RADIUS};
pub use hue::{blend_target, random_hue_near, HueBlender, DAY_HUE, HUE_WEIGHTS, NIGHT_HUE, PRESSURE_HISTORY};

use crate::config::LampConfig;
use crate::signals::SignalReading;

/// Blobs live in the top 85% of the lamp; the rest is the base.
pub const FLOOR_FRACTION: f32 = 0.85;

/// Share of blobs recoloured on every resample.
pub const RECOLOR_FRACTION: f32 = 0.3;

/// Uniform randomness for the simulation. Production uses `fastrand::Rng`;
/// tests plug in fixed sequences.
pub trait RandomSource {
    /// Sample in `[0, 1)`.
    fn unit(&mut self) -> f32;

    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.unit()
    }
}

impl RandomSource for fastrand::Rng {
    fn unit(&mut self) -> f32 {
        self.f32()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn unit(&mut self) -> f32 {
        (**self).unit()
    }
}

/// Read-only view of everything a painter needs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub width: f32,
    pub height: f32,
    pub blobs: &'a [Blob],
    pub ripples: &'a [Ripple],
    pub hue: f32,
    pub minimized: bool,
    pub minimized_height: f32,
}

impl Scene<'_> {
    pub fn floor_y(&self) -> f32 {
        self.height * FLOOR_FRACTION
    }

    /// Vertical slice of the lamp currently on screen.
    pub fn visible_band(&self) -> (f32, f32) {
        if self.minimized {
            ((self.height - self.minimized_height).max(0.0), self.height)
        } else {
            (0.0, self.height)
        }
    }
}

/// The simulation as the host sees it: `step` every frame, `resample` on the
/// coarse timer, `scene` for painting, plus the interaction entry points.
pub struct Lamp<R: RandomSource = fastrand::Rng> {
    cfg: LampConfig,
    field: BlobField,
    effects: EffectLayer,
    hue: HueBlender,
    rng: R,
    minimized: bool,
}

impl Lamp<fastrand::Rng> {
    pub fn new(cfg: LampConfig) -> Self {
        Self::with_rng(cfg, fastrand::Rng::new())
    }
}

impl<R: RandomSource> Lamp<R> {
    pub fn with_rng(cfg: LampConfig, mut rng: R) -> Self {
        let cfg = cfg.sanitized();
        let field = BlobField::new(&cfg, &mut rng);
        let hue = HueBlender::new(cfg.base_hue);
        Self {
            cfg,
            field,
            effects: EffectLayer::default(),
            hue,
            rng,
            minimized: false,
        }
    }

    /// Swap in a prepared field (tests, replays of hand-built states).
    pub fn with_field(mut self, field: BlobField) -> Self {
        self.field = field;
        self
    }

    pub fn config(&self) -> &LampConfig {
        &self.cfg
    }

    pub fn field(&self) -> &BlobField {
        &self.field
    }

    pub fn effects(&self) -> &EffectLayer {
        &self.effects
    }

    pub fn hue(&self) -> &HueBlender {
        &self.hue
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Advance one frame. Returns false when the frame was skipped
    /// (minimized, or `dt` above the stall threshold).
    pub fn step(&mut self, dt: f32) -> bool {
        if self.minimized {
            return false;
        }
        if !self.field.step(dt, &self.cfg, &mut self.rng) {
            return false;
        }
        self.effects.advance(dt);
        true
    }

    /// Coarse-timer work: fold the new reading into the target hue, move the
    /// current hue one smoothing step and recolour a few blobs.
    pub fn resample(&mut self, reading: &SignalReading) {
        self.hue.resample(reading);
        self.hue.tick(self.cfg.transition_speed);
        self.field.recolor_some(
            RECOLOR_FRACTION,
            self.hue.current(),
            self.cfg.hue_variance,
            self.cfg.blob_alpha,
            &mut self.rng,
        );
    }

    /// New target hue for changed page signals; the current hue still moves
    /// only on `resample`.
    pub fn retarget(&mut self, reading: &SignalReading) -> f32 {
        self.hue.retarget(reading)
    }

    /// Primary activation at lamp-local coordinates. Returns how many blobs
    /// reacted. Ignored while minimized since nothing steps.
    pub fn primary(&mut self, x: f32, y: f32) -> usize {
        if self.minimized {
            return 0;
        }
        self.effects.spawn(x, y);
        self.field.impulse_at(x, y, self.hue.current(), &self.cfg, &mut self.rng)
    }

    /// Activation somewhere outside the lamp.
    pub fn outside_click(&mut self) {
        self.field.click_wobble(&mut self.rng);
    }

    pub fn burst(&mut self) {
        if self.minimized {
            self.set_minimized(false);
        }
        self.field.burst(&self.cfg, &mut self.rng);
        let hue = self.rng.unit() * 360.0;
        self.hue.reset(hue);
    }

    pub fn drag_start(&mut self) {
        self.field.stir(&mut self.rng);
    }

    pub fn drag_move(&mut self) {
        self.field.jostle(&mut self.rng);
    }

    pub fn drag_end(&mut self) {
        self.field.begin_morph(&self.cfg, &mut self.rng);
    }

    /// Returns true when the state actually changed.
    pub fn set_minimized(&mut self, on: bool) -> bool {
        if on == self.minimized {
            return false;
        }
        if on {
            self.field.settle();
            self.effects.clear();
        } else {
            self.field.rise(&mut self.rng);
        }
        self.minimized = on;
        true
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            width: self.cfg.width,
            height: self.cfg.height,
            blobs: self.field.blobs(),
            ripples: self.effects.ripples(),
            hue: self.hue.current(),
            minimized: self.minimized,
            minimized_height: self.cfg.minimized_height,
        }
    }

    pub fn teardown(&mut self) {
        self.effects.clear();
    }
}
