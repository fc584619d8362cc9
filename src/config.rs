use crate::color::Rgba;
use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "lava-blob", version, about = "Signal-tinted lava lamp for the terminal")]
pub struct Config {
    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, value_enum, default_value_t = PainterMode::Auto)]
    pub painter: PainterMode,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_probe: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    #[arg(long, value_enum, default_value_t = PressureSource::Memory)]
    pub pressure: PressureSource,

    /// key = value file layered between the built-in defaults and these flags.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the effective lamp configuration and exit.
    #[arg(long, default_value_t = false)]
    pub dump_config: bool,

    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long)]
    pub prefs: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub no_prefs: bool,

    #[command(flatten)]
    pub lamp: LampArgs,
}

/// Per-field overrides; anything left unset falls through to the file / defaults.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct LampArgs {
    #[arg(long)]
    pub width: Option<f32>,
    #[arg(long)]
    pub height: Option<f32>,
    #[arg(long)]
    pub blobs: Option<usize>,
    #[arg(long)]
    pub min_radius: Option<f32>,
    #[arg(long)]
    pub max_radius: Option<f32>,
    #[arg(long)]
    pub base_hue: Option<f32>,
    #[arg(long)]
    pub hue_variance: Option<f32>,
    #[arg(long)]
    pub click_hue_variance: Option<f32>,
    #[arg(long)]
    pub transition_speed: Option<f32>,
    #[arg(long, value_parser = Rgba::parse)]
    pub background: Option<Rgba>,
    #[arg(long, value_parser = Rgba::parse)]
    pub backdrop: Option<Rgba>,
    #[arg(long)]
    pub glass_opacity: Option<f32>,
    #[arg(long)]
    pub blob_alpha: Option<f32>,
    #[arg(long)]
    pub idle_threshold: Option<f32>,
    #[arg(long)]
    pub impulse_strength: Option<f32>,
    #[arg(long)]
    pub burst_strength: Option<f32>,
    #[arg(long)]
    pub ceiling_bounce: Option<f32>,
    #[arg(long)]
    pub gravity: Option<f32>,
    #[arg(long)]
    pub max_dt: Option<f32>,
    #[arg(long)]
    pub resample_ms: Option<u64>,
    #[arg(long)]
    pub minimized_height: Option<f32>,
    #[arg(long)]
    pub scroll_extent: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RendererMode {
    #[default]
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    #[value(alias = "hires", alias = "dots")]
    Braille,
    Kitty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PainterMode {
    #[default]
    Auto,
    Raster,
    #[value(alias = "fallback", alias = "image")]
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PressureSource {
    #[default]
    #[value(alias = "mem", alias = "meminfo")]
    Memory,
    #[value(alias = "time", alias = "pseudo")]
    Clock,
}

/// Everything the simulation and painters read. Independent of the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct LampConfig {
    pub width: f32,
    pub height: f32,
    pub blob_count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    pub base_hue: f32,
    pub hue_variance: f32,
    pub click_hue_variance: f32,
    pub transition_speed: f32,
    pub background: Rgba,
    pub backdrop: Rgba,
    pub glass_opacity: f32,
    pub blob_alpha: f32,
    pub idle_threshold_secs: f32,
    pub impulse_strength: f32,
    pub burst_strength: f32,
    pub ceiling_bounce: f32,
    pub gravity: f32,
    pub max_dt: f32,
    pub resample_interval: Duration,
    pub minimized_height: f32,
    pub scroll_extent: f32,
}

impl Default for LampConfig {
    fn default() -> Self {
        Self {
            width: 120.0,
            height: 200.0,
            blob_count: 8,
            min_radius: 15.0,
            max_radius: 40.0,
            base_hue: 240.0,
            hue_variance: 20.0,
            click_hue_variance: 40.0,
            transition_speed: 0.05,
            background: Rgba::new(10.0, 5.0, 15.0, 0.9),
            backdrop: Rgba::rgb(6, 6, 10),
            glass_opacity: 0.1,
            blob_alpha: 0.8,
            idle_threshold_secs: 10.0,
            impulse_strength: 2.0,
            burst_strength: 3.0,
            ceiling_bounce: 0.2,
            gravity: 0.0,
            max_dt: 0.1,
            resample_interval: Duration::from_millis(1000),
            minimized_height: 60.0,
            scroll_extent: 120.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Io(String),
    Parse { line: usize, message: String },
    InvalidValue { key: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Parse { line, message } => write!(f, "parse error at line {line}: {message}"),
            Self::InvalidValue { key, message } => write!(f, "invalid value for {key}: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl LampConfig {
    pub fn floor_y(&self) -> f32 {
        self.height * crate::sim::FLOOR_FRACTION
    }

    /// Repair values the simulation cannot work with instead of rejecting them.
    pub fn sanitized(mut self) -> Self {
        self.width = finite_or(self.width, 120.0).max(8.0);
        self.height = finite_or(self.height, 200.0).max(8.0);
        self.min_radius = finite_or(self.min_radius, 15.0).max(1.0);
        self.max_radius = finite_or(self.max_radius, 40.0).max(1.0);
        if self.min_radius > self.max_radius {
            std::mem::swap(&mut self.min_radius, &mut self.max_radius);
        }
        // Blobs must fit both horizontally and inside the liquid region.
        let fit = (self.width * 0.5).min(self.floor_y() * 0.5);
        self.max_radius = self.max_radius.min(fit);
        self.min_radius = self.min_radius.min(self.max_radius);
        self.transition_speed = finite_or(self.transition_speed, 0.05).clamp(1e-4, 1.0);
        self.glass_opacity = finite_or(self.glass_opacity, 0.1).clamp(0.0, 1.0);
        self.blob_alpha = finite_or(self.blob_alpha, 0.8).clamp(0.0, 1.0);
        self.idle_threshold_secs = finite_or(self.idle_threshold_secs, 10.0).max(0.1);
        self.ceiling_bounce = finite_or(self.ceiling_bounce, 0.2).clamp(0.0, 1.0);
        self.gravity = finite_or(self.gravity, 0.0);
        self.max_dt = finite_or(self.max_dt, 0.1).clamp(0.001, 1.0);
        if self.resample_interval.is_zero() {
            self.resample_interval = Duration::from_millis(1000);
        }
        self.minimized_height = finite_or(self.minimized_height, 60.0).clamp(1.0, self.height);
        self.scroll_extent = finite_or(self.scroll_extent, 120.0).max(0.0);
        self
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let mut cfg = Self::default();
        cfg.apply_text(&text)?;
        Ok(cfg)
    }

    /// Apply `key = value` lines on top of the current values.
    pub fn apply_text(&mut self, text: &str) -> Result<(), ConfigError> {
        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key_raw, value_raw)) = line.split_once('=') else {
                return Err(ConfigError::Parse {
                    line: line_no,
                    message: "expected <key> = <value>".to_string(),
                });
            };
            self.set(key_raw.trim(), value_raw.trim())?;
        }
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "width" => self.width = num(key, value)?,
            "height" => self.height = num(key, value)?,
            "blob_count" | "blobs" => self.blob_count = int(key, value)?,
            "min_radius" => self.min_radius = num(key, value)?,
            "max_radius" => self.max_radius = num(key, value)?,
            "base_hue" => self.base_hue = num(key, value)?,
            "hue_variance" => self.hue_variance = num(key, value)?,
            "click_hue_variance" => self.click_hue_variance = num(key, value)?,
            "transition_speed" => self.transition_speed = num(key, value)?,
            "background" => self.background = color(key, value)?,
            "backdrop" => self.backdrop = color(key, value)?,
            "glass_opacity" => self.glass_opacity = num(key, value)?,
            "blob_alpha" => self.blob_alpha = num(key, value)?,
            "idle_threshold" => self.idle_threshold_secs = num(key, value)?,
            "impulse_strength" => self.impulse_strength = num(key, value)?,
            "burst_strength" => self.burst_strength = num(key, value)?,
            "ceiling_bounce" => self.ceiling_bounce = num(key, value)?,
            "gravity" => self.gravity = num(key, value)?,
            "max_dt" => self.max_dt = num(key, value)?,
            "resample_ms" => self.resample_interval = Duration::from_millis(int::<u64>(key, value)?),
            "minimized_height" => self.minimized_height = num(key, value)?,
            "scroll_extent" => self.scroll_extent = num(key, value)?,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "unknown key".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn apply_args(&mut self, args: &LampArgs) {
        fn put<T: Copy>(slot: &mut T, v: Option<T>) {
            if let Some(v) = v {
                *slot = v;
            }
        }
        put(&mut self.width, args.width);
        put(&mut self.height, args.height);
        put(&mut self.blob_count, args.blobs);
        put(&mut self.min_radius, args.min_radius);
        put(&mut self.max_radius, args.max_radius);
        put(&mut self.base_hue, args.base_hue);
        put(&mut self.hue_variance, args.hue_variance);
        put(&mut self.click_hue_variance, args.click_hue_variance);
        put(&mut self.transition_speed, args.transition_speed);
        put(&mut self.background, args.background);
        put(&mut self.backdrop, args.backdrop);
        put(&mut self.glass_opacity, args.glass_opacity);
        put(&mut self.blob_alpha, args.blob_alpha);
        put(&mut self.idle_threshold_secs, args.idle_threshold);
        put(&mut self.impulse_strength, args.impulse_strength);
        put(&mut self.burst_strength, args.burst_strength);
        put(&mut self.ceiling_bounce, args.ceiling_bounce);
        put(&mut self.gravity, args.gravity);
        put(&mut self.max_dt, args.max_dt);
        put(&mut self.minimized_height, args.minimized_height);
        put(&mut self.scroll_extent, args.scroll_extent);
        if let Some(ms) = args.resample_ms {
            self.resample_interval = Duration::from_millis(ms);
        }
    }

    /// Same format `apply_text` reads.
    pub fn to_text(&self) -> String {
        format!(
            "# lava_blob config v1\n\
width = {}\nheight = {}\nblob_count = {}\nmin_radius = {}\nmax_radius = {}\n\
base_hue = {}\nhue_variance = {}\nclick_hue_variance = {}\ntransition_speed = {}\n\
background = {}\nbackdrop = {}\nglass_opacity = {}\nblob_alpha = {}\n\
idle_threshold = {}\nimpulse_strength = {}\nburst_strength = {}\n\
ceiling_bounce = {}\ngravity = {}\nmax_dt = {}\nresample_ms = {}\n\
minimized_height = {}\nscroll_extent = {}\n",
            self.width,
            self.height,
            self.blob_count,
            self.min_radius,
            self.max_radius,
            self.base_hue,
            self.hue_variance,
            self.click_hue_variance,
            self.transition_speed,
            self.background,
            self.backdrop,
            self.glass_opacity,
            self.blob_alpha,
            self.idle_threshold_secs,
            self.impulse_strength,
            self.burst_strength,
            self.ceiling_bounce,
            self.gravity,
            self.max_dt,
            self.resample_interval.as_millis(),
            self.minimized_height,
            self.scroll_extent,
        )
    }
}

impl Config {
    /// Defaults, then the optional file, then explicit flags.
    pub fn lamp_config(&self) -> Result<LampConfig, ConfigError> {
        let mut lamp = match self.config.as_deref() {
            Some(path) => LampConfig::load(path)?,
            None => LampConfig::default(),
        };
        lamp.apply_args(&self.lamp);
        Ok(lamp.sanitized())
    }
}

fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

fn num(key: &str, value: &str) -> Result<f32, ConfigError> {
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{value:?} is not a finite number"),
        })
}

fn int<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{value:?} is not a non-negative integer"),
    })
}

fn color(key: &str, value: &str) -> Result<Rgba, ConfigError> {
    Rgba::parse(value).map_err(|message| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    })
}
