use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use lava_blob::config::LampConfig;
use lava_blob::paint::{make_painter, Canvas, PainterKind};
use lava_blob::signals::{clock_pressure, Daypart, SignalReading};
use lava_blob::sim::{Lamp, FLOOR_FRACTION};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Raster,
    Static,
    Both,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "benchmark",
    version,
    about = "Headless lamp step + paint timing with an optional CI smoke gate"
)]
struct Args {
    #[arg(long, value_enum, default_value_t = Mode::Both)]
    mode: Mode,

    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
    frames: u64,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 160, value_parser = clap::value_parser!(u64).range(1..))]
    w: u64,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 176, value_parser = clap::value_parser!(u64).range(1..))]
    h: u64,

    #[arg(long, default_value_t = 8)]
    blobs: usize,

    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Fail when a painter stays blank, a blob leaves the lamp or a frame is too slow.
    #[arg(long, default_missing_value = "true", num_args = 0..=1, action = ArgAction::Set, default_value_t = false)]
    ci_smoke: bool,

    /// Cap the run at 120 frames.
    #[arg(long, default_missing_value = "true", num_args = 0..=1, action = ArgAction::Set, default_value_t = false)]
    quick: bool,

    #[arg(long, default_value_t = 16.0, value_parser = parse_max_ms)]
    max_ms: f64,
}

impl Args {
    fn frames(&self) -> usize {
        let frames = self.frames as usize;
        if self.quick { frames.min(120) } else { frames }
    }
}

fn parse_max_ms(s: &str) -> Result<f64, String> {
    let v: f64 = s.trim().parse().map_err(|e| format!("{e}"))?;
    if !v.is_finite() || v < 0.1 {
        return Err("expected a finite value >= 0.1".into());
    }
    Ok(v)
}

/// Slowly cycling signals so every hue term moves during the run.
fn synth_reading(frame: usize) -> SignalReading {
    let sec = (frame / 60) as u32;
    SignalReading::new(
        clock_pressure(sec % 60),
        ((frame % 900) as f32 / 600.0).min(1.0),
        ((frame as f32 / 240.0).sin() * 0.5 + 0.5),
        if (frame / 1800) % 2 == 0 { Daypart::Day } else { Daypart::Night },
    )
}

fn invariant_violations(lamp: &Lamp) -> usize {
    let cfg = lamp.config();
    let floor_y = cfg.height * FLOOR_FRACTION;
    let eps = 1e-3;
    lamp.field()
        .blobs()
        .iter()
        .filter(|b| {
            b.radius < cfg.min_radius - eps
                || b.radius > cfg.max_radius + eps
                || b.x < b.radius - eps
                || b.x > cfg.width - b.radius + eps
                || b.y < b.radius - eps
                || b.y > floor_y - b.radius + eps
        })
        .count()
}

struct Outcome {
    step_ms: f64,
    paint_ms: f64,
    lit: usize,
    violations: usize,
}

fn bench_painter(args: &Args, kind: PainterKind) -> Outcome {
    let cfg = LampConfig {
        blob_count: args.blobs,
        ..LampConfig::default()
    };
    let mut painter = make_painter(kind, &cfg);
    let mut lamp = Lamp::with_rng(cfg, fastrand::Rng::with_seed(args.seed));
    let mut canvas = Canvas::new(args.w as usize, args.h as usize);
    let dt = 1.0 / 60.0;

    let mut step_time = Duration::ZERO;
    let mut paint_time = Duration::ZERO;
    let mut lit = 0usize;
    let mut violations = 0usize;

    let frames = args.frames();
    for f in 0..frames {
        let t0 = Instant::now();
        if f % 60 == 0 {
            lamp.resample(&synth_reading(f));
        }
        if f % 45 == 10 {
            let (w, h) = (lamp.config().width, lamp.config().height);
            lamp.primary(w * 0.5, h * 0.5);
        }
        if f % 300 == 150 {
            lamp.burst();
        }
        lamp.step(dt);
        step_time += t0.elapsed();
        violations += invariant_violations(&lamp);

        let t1 = Instant::now();
        painter.paint(&lamp.scene(), &mut canvas);
        paint_time += t1.elapsed();

        let px = canvas.pixels();
        let first = px.get(..4).unwrap_or(&[0, 0, 0, 0]);
        if px.chunks_exact(4).any(|p| p != first) {
            lit += 1;
        }
    }

    let frames = frames as f64;
    Outcome {
        step_ms: step_time.as_secs_f64() * 1000.0 / frames,
        paint_ms: paint_time.as_secs_f64() * 1000.0 / frames,
        lit,
        violations,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let frames = args.frames();
    let kinds: &[PainterKind] = match args.mode {
        Mode::Raster => &[PainterKind::Raster],
        Mode::Static => &[PainterKind::Static],
        Mode::Both => &[PainterKind::Raster, PainterKind::Static],
    };

    println!(
        "Lamp benchmark: frames={} canvas={}x{} blobs={} seed={} quick={}",
        frames, args.w, args.h, args.blobs, args.seed, args.quick
    );

    let mut failures = Vec::<String>::new();
    for &kind in kinds {
        let o = bench_painter(&args, kind);
        let total = o.step_ms + o.paint_ms;
        println!(
            "{:<7} step {:>7.3} ms  paint {:>7.3} ms  total {:>7.3} ms/frame  lit={:>4}/{}  violations={}",
            kind.label(),
            o.step_ms,
            o.paint_ms,
            total,
            o.lit,
            frames,
            o.violations
        );
        if o.lit == 0 {
            failures.push(format!("{} canvas stayed blank", kind.label()));
        }
        if o.violations > 0 {
            failures.push(format!("{} blob bounds broken {} times", kind.label(), o.violations));
        }
        if total > args.max_ms {
            failures.push(format!("{} too slow ({total:.3} ms/frame > {:.3})", kind.label(), args.max_ms));
        }
    }

    if args.ci_smoke {
        if !failures.is_empty() {
            eprintln!("CI smoke: FAIL");
            for f in &failures {
                eprintln!("  {f}");
            }
            anyhow::bail!("ci smoke failed");
        }
        println!("CI smoke: PASS (max_ms={:.3})", args.max_ms);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_values_and_unknown_flags() {
        assert!(Args::try_parse_from(["benchmark", "--frames", "abc"]).is_err());
        assert!(Args::try_parse_from(["benchmark", "--frames", "0"]).is_err());
        assert!(Args::try_parse_from(["benchmark", "--max-ms", "0"]).is_err());
        assert!(Args::try_parse_from(["benchmark", "--sparkle"]).is_err());
    }

    #[test]
    fn flags_and_quick_cap() {
        let args = Args::try_parse_from([
            "benchmark", "--mode", "static", "--frames", "500", "--quick", "--ci-smoke", "false",
        ])
        .unwrap();
        assert_eq!(args.mode, Mode::Static);
        assert!(!args.ci_smoke);
        assert_eq!(args.frames(), 120);

        let defaults = Args::try_parse_from(["benchmark"]).unwrap();
        assert_eq!((defaults.mode, defaults.frames(), defaults.w, defaults.h), (Mode::Both, 600, 160, 176));
    }
}
