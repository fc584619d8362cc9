use crate::config::PressureSource;
use chrono::{Local, Timelike};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Daypart {
    Day,
    Night,
}

impl Daypart {
    /// Day runs from 06:00 through the end of 18:59.
    pub fn from_hour(hour: u32) -> Self {
        if (6..=18).contains(&hour) {
            Self::Day
        } else {
            Self::Night
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
        }
    }
}

/// One normalized sample of the outside world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalReading {
    pub pressure_ratio: f32,
    pub idle_factor: f32,
    pub scroll_fraction: f32,
    pub daypart: Daypart,
}

impl SignalReading {
    pub fn new(pressure_ratio: f32, idle_factor: f32, scroll_fraction: f32, daypart: Daypart) -> Self {
        Self {
            pressure_ratio: unit_clamp(pressure_ratio),
            idle_factor: unit_clamp(idle_factor),
            scroll_fraction: unit_clamp(scroll_fraction),
            daypart,
        }
    }
}

fn unit_clamp(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

/// Source of a 0..1 "how loaded is the host" ratio.
pub trait PressureProbe {
    fn name(&self) -> &'static str;
    /// `None` when the platform cannot tell.
    fn sample(&mut self) -> Option<f32>;
}

/// Linux memory pressure from `/proc/meminfo`.
#[derive(Debug, Clone)]
pub struct MemInfoProbe {
    path: PathBuf,
}

impl Default for MemInfoProbe {
    fn default() -> Self {
        Self::with_path("/proc/meminfo")
    }
}

impl MemInfoProbe {
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PressureProbe for MemInfoProbe {
    fn name(&self) -> &'static str {
        "meminfo"
    }

    fn sample(&mut self) -> Option<f32> {
        let text = fs::read_to_string(&self.path).ok()?;
        parse_meminfo(&text)
    }
}

/// `1 - MemAvailable / MemTotal`, or `None` if either line is missing.
pub fn parse_meminfo(text: &str) -> Option<f32> {
    let mut total = None;
    let mut available = None;
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let key = parts.next();
        let value = parts.next().and_then(|v| v.parse::<u64>().ok());
        match key {
            Some("MemTotal:") => total = value,
            Some("MemAvailable:") => available = value,
            _ => {}
        }
    }
    let (total, available) = (total?, available?);
    if total == 0 {
        return None;
    }
    let used = 1.0 - available.min(total) as f64 / total as f64;
    Some(used.clamp(0.0, 1.0) as f32)
}

/// Slow wave standing in for memory pressure: 0.3..0.7.
pub fn clock_pressure(second: u32) -> f32 {
    0.3 + ((second as f32 / 10.0).sin() + 1.0) * 0.2
}

/// Remembers when the user last did anything.
#[derive(Debug, Clone, Copy)]
pub struct ActivityTracker {
    last: Instant,
}

impl ActivityTracker {
    pub fn new(now: Instant) -> Self {
        Self { last: now }
    }

    pub fn touch(&mut self, now: Instant) {
        self.last = now;
    }

    pub fn idle_secs(&self, now: Instant) -> f32 {
        now.saturating_duration_since(self.last).as_secs_f32()
    }

    pub fn idle_factor(&self, now: Instant, threshold_secs: f32) -> f32 {
        if threshold_secs <= 0.0 {
            return 1.0;
        }
        (self.idle_secs(now) / threshold_secs).min(1.0)
    }
}

/// The terminal has no page to scroll, so the lamp carries a virtual one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollDoc {
    offset: f32,
    extent: f32,
    viewport: f32,
}

impl ScrollDoc {
    pub fn new(extent: f32, viewport: f32) -> Self {
        Self {
            offset: 0.0,
            extent: extent.max(0.0),
            viewport: viewport.max(0.0),
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    fn max_offset(&self) -> f32 {
        (self.extent - self.viewport).max(0.0)
    }

    pub fn scroll_by(&mut self, delta: f32) {
        if delta.is_finite() {
            self.offset = (self.offset + delta).clamp(0.0, self.max_offset());
        }
    }

    pub fn to_start(&mut self) {
        self.offset = 0.0;
    }

    pub fn to_end(&mut self) {
        self.offset = self.max_offset();
    }

    pub fn set_viewport(&mut self, viewport: f32) {
        self.viewport = viewport.max(0.0);
        self.offset = self.offset.min(self.max_offset());
    }

    /// 0 when nothing can scroll.
    pub fn fraction(&self) -> f32 {
        let max = self.max_offset();
        if max <= 0.0 { 0.0 } else { (self.offset / max).clamp(0.0, 1.0) }
    }
}

pub struct SignalSampler {
    probe: Option<Box<dyn PressureProbe>>,
    idle_threshold_secs: f32,
    fallback_logged: bool,
}

impl SignalSampler {
    pub fn new(source: PressureSource, idle_threshold_secs: f32) -> Self {
        let probe: Option<Box<dyn PressureProbe>> = match source {
            PressureSource::Memory => Some(Box::new(MemInfoProbe::default())),
            PressureSource::Clock => None,
        };
        Self::with_probe(probe, idle_threshold_secs)
    }

    pub fn with_probe(probe: Option<Box<dyn PressureProbe>>, idle_threshold_secs: f32) -> Self {
        Self {
            probe,
            idle_threshold_secs,
            fallback_logged: false,
        }
    }

    pub fn source_label(&self) -> &'static str {
        self.probe.as_ref().map_or("clock", |p| p.name())
    }

    pub fn sample(&mut self, now: Instant, activity: &ActivityTracker, scroll: &ScrollDoc) -> SignalReading {
        let local = Local::now();
        self.sample_at(now, activity, scroll, local.hour(), local.second())
    }

    /// Same as `sample` with the wall clock supplied by the caller.
    pub fn sample_at(
        &mut self,
        now: Instant,
        activity: &ActivityTracker,
        scroll: &ScrollDoc,
        hour: u32,
        second: u32,
    ) -> SignalReading {
        let measured = self.probe.as_mut().and_then(|p| p.sample());
        let pressure = match measured {
            Some(v) => v,
            None => {
                if !self.fallback_logged {
                    self.fallback_logged = true;
                    log::info!("pressure probe unavailable; using clock pseudo-signal");
                }
                clock_pressure(second)
            }
        };
        let reading = SignalReading::new(
            pressure,
            activity.idle_factor(now, self.idle_threshold_secs),
            scroll.fraction(),
            Daypart::from_hour(hour),
        );
        log::debug!(
            "signals: pressure={:.3} idle={:.2} scroll={:.2} {}",
            reading.pressure_ratio,
            reading.idle_factor,
            reading.scroll_fraction,
            reading.daypart.label()
        );
        reading
    }
}
