use crate::color::Hsla;
use crate::signals::{Daypart, SignalReading};
use crate::sim::RandomSource;
use std::collections::VecDeque;

/// Memory, activity, scroll, time. Sums to 1.
pub const HUE_WEIGHTS: [f32; 4] = [0.5, 0.2, 0.2, 0.1];

/// Pressure samples averaged into the memory hue.
pub const PRESSURE_HISTORY: usize = 10;

pub const DAY_HUE: f32 = 210.0;
pub const NIGHT_HUE: f32 = 30.0;

/// Target hue for one reading, given an already-averaged pressure.
///
/// Memory runs green (120) to red (0), activity cyan (180) to blue (240),
/// scroll cyan (180) to purple (300).
pub fn blend_target(avg_pressure: f32, reading: &SignalReading) -> f32 {
    let memory_hue = 120.0 - avg_pressure.clamp(0.0, 1.0) * 120.0;
    let activity_hue = reading.idle_factor.clamp(0.0, 1.0) * 60.0 + 180.0;
    let scroll_hue = 180.0 + reading.scroll_fraction.clamp(0.0, 1.0) * 120.0;
    let time_hue = match reading.daypart {
        Daypart::Day => DAY_HUE,
        Daypart::Night => NIGHT_HUE,
    };
    let [w_mem, w_act, w_scroll, w_time] = HUE_WEIGHTS;
    memory_hue * w_mem + activity_hue * w_act + scroll_hue * w_scroll + time_hue * w_time
}

/// Fresh blob colour around `base`; saturation 70..100, lightness 50..80.
pub fn random_hue_near(base: f32, variance: f32, alpha: f32, rng: &mut impl RandomSource) -> Hsla {
    let h = base + rng.range(-variance, variance);
    let s = rng.range(70.0, 100.0);
    let l = rng.range(50.0, 80.0);
    Hsla::new(h, s, l, alpha)
}

#[derive(Debug, Clone)]
pub struct HueBlender {
    current: f32,
    target: f32,
    history: VecDeque<f32>,
}

impl HueBlender {
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            history: VecDeque::with_capacity(PRESSURE_HISTORY),
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn average_pressure(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }

    /// Record the reading's pressure and recompute the target. Returns the new target.
    pub fn resample(&mut self, reading: &SignalReading) -> f32 {
        let pressure = if reading.pressure_ratio.is_finite() {
            reading.pressure_ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if self.history.len() == PRESSURE_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(pressure);
        self.target = blend_target(self.average_pressure(), reading);
        self.target
    }

    /// Recompute the target from the current history without recording a
    /// pressure sample.
    pub fn retarget(&mut self, reading: &SignalReading) -> f32 {
        self.target = blend_target(self.average_pressure(), reading);
        self.target
    }

    /// One exponential smoothing step toward the target.
    pub fn tick(&mut self, speed: f32) -> f32 {
        let speed = if speed.is_finite() { speed.clamp(1e-4, 1.0) } else { 1.0 };
        self.current += (self.target - self.current) * speed;
        self.current
    }

    pub fn reset(&mut self, hue: f32) {
        self.current = hue;
        self.target = hue;
    }
}
