pub const RIPPLE_START_RADIUS: f32 = 5.0;
pub const RIPPLE_GROWTH: f32 = 2.0;
pub const RIPPLE_START_OPACITY: f32 = 0.7;
pub const RIPPLE_FADE: f32 = 0.01;

/// Expanding ring left by a primary activation.
#[derive(Debug, Clone, PartialEq)]
pub struct Ripple {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub opacity: f32,
    /// Elapsed time in 60 fps frames.
    pub age: f32,
}

impl Ripple {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            radius: RIPPLE_START_RADIUS,
            opacity: RIPPLE_START_OPACITY,
            age: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EffectLayer {
    ripples: Vec<Ripple>,
}

impl EffectLayer {
    pub fn spawn(&mut self, x: f32, y: f32) {
        self.ripples.push(Ripple::new(x, y));
    }

    /// Grow and fade every ripple; spent ones are dropped in the same call.
    pub fn advance(&mut self, dt: f32) {
        let frames = dt * 60.0;
        for r in &mut self.ripples {
            r.age += frames;
            r.radius += RIPPLE_GROWTH * frames;
            // Derived from age rather than decremented, so rounding never drifts.
            r.opacity = RIPPLE_START_OPACITY - RIPPLE_FADE * r.age;
        }
        self.ripples.retain(|r| r.opacity > 0.0);
    }

    pub fn ripples(&self) -> &[Ripple] {
        &self.ripples
    }

    pub fn len(&self) -> usize {
        self.ripples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ripples.is_empty()
    }

    pub fn clear(&mut self) {
        self.ripples.clear();
    }
}
