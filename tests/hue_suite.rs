use lava_blob::config::{LampConfig, PressureSource};
use lava_blob::signals::{
    clock_pressure, parse_meminfo, ActivityTracker, Daypart, MemInfoProbe, PressureProbe,
    ScrollDoc, SignalReading, SignalSampler,
};
use lava_blob::sim::{
    blend_target, random_hue_near, HueBlender, Lamp, RandomSource, HUE_WEIGHTS, PRESSURE_HISTORY,
};
use std::time::{Duration, Instant};

struct Fixed(f32);

impl RandomSource for Fixed {
    fn unit(&mut self) -> f32 {
        self.0
    }
}

struct StubProbe(Option<f32>);

impl PressureProbe for StubProbe {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn sample(&mut self) -> Option<f32> {
        self.0
    }
}

fn reading(p: f32, idle: f32, scroll: f32, daypart: Daypart) -> SignalReading {
    SignalReading::new(p, idle, scroll, daypart)
}

// ── HueBlender ──────────────────────────────────────────────────────────────

#[test]
fn weights_sum_to_one() {
    let sum: f32 = HUE_WEIGHTS.iter().sum();
    assert!((sum - 1.0).abs() < 1e-6, "weights sum to {sum}");
}

#[test]
fn lowest_signals_give_fixed_targets() {
    let day = blend_target(0.0, &reading(0.0, 0.0, 0.0, Daypart::Day));
    let night = blend_target(0.0, &reading(0.0, 0.0, 0.0, Daypart::Night));
    assert!((day - 153.0).abs() < 1e-3, "day target {day}");
    assert!((night - 135.0).abs() < 1e-3, "night target {night}");
}

#[test]
fn target_stays_on_the_wheel_for_extreme_inputs() {
    for daypart in [Daypart::Day, Daypart::Night] {
        for v in [0.0f32, 1.0] {
            let t = blend_target(v, &reading(v, v, v, daypart));
            assert!((0.0..=360.0).contains(&t), "target {t} for input {v}");
        }
    }
    let high = blend_target(1.0, &reading(1.0, 1.0, 1.0, Daypart::Day));
    assert!((high - 129.0).abs() < 1e-3, "all-high day target {high}");
}

#[test]
fn tick_converges_monotonically() {
    for speed in [0.01f32, 0.05, 0.5, 1.0] {
        let mut hue = HueBlender::new(240.0);
        hue.resample(&reading(0.0, 0.0, 0.0, Daypart::Day));
        let target = hue.target();
        let mut prev_gap = (target - hue.current()).abs();
        for _ in 0..500 {
            let cur = hue.tick(speed);
            let gap = (target - cur).abs();
            assert!(gap <= prev_gap, "gap grew at speed {speed}: {prev_gap} -> {gap}");
            assert!(cur >= target - 1e-3, "overshot target at speed {speed}");
            prev_gap = gap;
        }
        assert!(prev_gap < 1.0, "speed {speed} left gap {prev_gap}");
    }
}

#[test]
fn speed_one_jumps_straight_to_target() {
    let mut hue = HueBlender::new(0.0);
    hue.resample(&reading(0.0, 0.0, 0.0, Daypart::Night));
    assert!((hue.tick(1.0) - hue.target()).abs() < 1e-6);
}

#[test]
fn retarget_keeps_history_and_current_hue() {
    let mut hue = HueBlender::new(240.0);
    assert!((hue.resample(&reading(1.0, 0.0, 0.0, Daypart::Day)) - 93.0).abs() < 1e-3);

    // The reading's own pressure is ignored; the recorded average stays 1.
    let target = hue.retarget(&reading(0.0, 0.0, 1.0, Daypart::Day));
    assert!((target - 117.0).abs() < 1e-3, "target {target}");
    assert_eq!(hue.history_len(), 1);
    assert_eq!(hue.current(), 240.0);
}

#[test]
fn pressure_history_is_bounded_fifo() {
    let mut hue = HueBlender::new(240.0);
    for _ in 0..PRESSURE_HISTORY {
        hue.resample(&reading(1.0, 0.0, 0.0, Daypart::Day));
    }
    assert_eq!(hue.history_len(), PRESSURE_HISTORY);
    assert!((hue.average_pressure() - 1.0).abs() < 1e-6);

    for _ in 0..PRESSURE_HISTORY {
        hue.resample(&reading(0.0, 0.0, 0.0, Daypart::Day));
    }
    assert_eq!(hue.history_len(), PRESSURE_HISTORY);
    assert_eq!(hue.average_pressure(), 0.0);
}

#[test]
fn averaged_pressure_drives_memory_hue() {
    let mut hue = HueBlender::new(240.0);
    hue.resample(&reading(1.0, 0.0, 0.0, Daypart::Day));
    let t = hue.resample(&reading(0.0, 0.0, 0.0, Daypart::Day));
    // average 0.5 -> memory hue 60.
    let expected = 60.0 * 0.5 + 180.0 * 0.2 + 180.0 * 0.2 + 210.0 * 0.1;
    assert!((t - expected).abs() < 1e-3, "target {t}");
}

#[test]
fn reset_pins_current_and_target() {
    let mut hue = HueBlender::new(240.0);
    hue.resample(&reading(0.4, 0.2, 0.1, Daypart::Day));
    hue.reset(17.0);
    assert_eq!(hue.current(), 17.0);
    assert_eq!(hue.target(), 17.0);
}

#[test]
fn random_hue_spans_the_documented_ranges() {
    let lo = random_hue_near(240.0, 20.0, 0.8, &mut Fixed(0.0));
    assert_eq!((lo.h, lo.s, lo.l, lo.a), (220.0, 70.0, 50.0, 0.8));
    let mid = random_hue_near(240.0, 20.0, 0.8, &mut Fixed(0.5));
    assert_eq!((mid.h, mid.s, mid.l), (240.0, 85.0, 65.0));
    assert_eq!(mid.opaque().a, 1.0);
}

#[test]
fn hue_wraps_only_when_converted() {
    let c = lava_blob::color::Hsla::new(480.0, 100.0, 50.0, 1.0);
    assert_eq!(c.h, 480.0);
    let wrapped = lava_blob::color::Hsla::new(120.0, 100.0, 50.0, 1.0);
    assert_eq!(c.to_rgba().to_u8(), wrapped.to_rgba().to_u8());
    assert_eq!(wrapped.to_rgba().to_u8(), [0, 255, 0]);
}

#[test]
fn lamp_resample_moves_hue_one_step() {
    let mut lamp = Lamp::with_rng(LampConfig::default(), Fixed(0.5));
    lamp.resample(&reading(0.0, 0.0, 0.0, Daypart::Day));
    let hue = lamp.hue();
    assert!((hue.target() - 153.0).abs() < 1e-3);
    let expected = 240.0 + (hue.target() - 240.0) * 0.05;
    assert!((hue.current() - expected).abs() < 1e-3, "current {}", hue.current());
}

// ── Signals ─────────────────────────────────────────────────────────────────

#[test]
fn daypart_boundaries() {
    assert_eq!(Daypart::from_hour(5), Daypart::Night);
    assert_eq!(Daypart::from_hour(6), Daypart::Day);
    assert_eq!(Daypart::from_hour(18), Daypart::Day);
    assert_eq!(Daypart::from_hour(19), Daypart::Night);
    assert_eq!(Daypart::from_hour(0), Daypart::Night);
}

#[test]
fn meminfo_parses_available_ratio() {
    let text = "MemTotal:       16000000 kB\nMemFree:         1000000 kB\nMemAvailable:    4000000 kB\n";
    let ratio = parse_meminfo(text).expect("ratio");
    assert!((ratio - 0.75).abs() < 1e-6);

    assert_eq!(parse_meminfo("MemTotal: 100 kB\n"), None);
    assert_eq!(parse_meminfo("MemTotal: 0 kB\nMemAvailable: 0 kB\n"), None);
    assert_eq!(parse_meminfo(""), None);
}

#[test]
fn meminfo_probe_missing_file_is_none() {
    let mut probe = MemInfoProbe::with_path("/definitely/not/here/meminfo");
    assert_eq!(probe.sample(), None);
}

#[test]
fn clock_pressure_stays_in_band() {
    for sec in 0..60 {
        let p = clock_pressure(sec);
        assert!((0.3..=0.7).contains(&p), "second {sec} -> {p}");
    }
    assert!((clock_pressure(0) - 0.5).abs() < 1e-6);
}

#[test]
fn reading_clamps_inputs() {
    let r = SignalReading::new(1.5, -0.5, f32::NAN, Daypart::Day);
    assert_eq!((r.pressure_ratio, r.idle_factor, r.scroll_fraction), (1.0, 0.0, 0.0));
}

#[test]
fn idle_factor_saturates_at_threshold() {
    let t0 = Instant::now();
    let mut act = ActivityTracker::new(t0);
    assert_eq!(act.idle_factor(t0, 10.0), 0.0);
    assert!((act.idle_factor(t0 + Duration::from_secs(5), 10.0) - 0.5).abs() < 1e-4);
    assert_eq!(act.idle_factor(t0 + Duration::from_secs(30), 10.0), 1.0);

    act.touch(t0 + Duration::from_secs(30));
    assert_eq!(act.idle_factor(t0 + Duration::from_secs(30), 10.0), 0.0);
}

#[test]
fn scroll_fraction_tracks_offset() {
    let mut doc = ScrollDoc::new(120.0, 20.0);
    assert_eq!(doc.fraction(), 0.0);
    doc.scroll_by(50.0);
    assert!((doc.fraction() - 0.5).abs() < 1e-6);
    doc.scroll_by(1000.0);
    assert_eq!(doc.fraction(), 1.0);
    doc.scroll_by(-3.0);
    assert!(doc.fraction() < 1.0);
    doc.to_start();
    assert_eq!(doc.fraction(), 0.0);
    doc.to_end();
    assert_eq!(doc.fraction(), 1.0);

    let mut short = ScrollDoc::new(10.0, 40.0);
    short.scroll_by(5.0);
    assert_eq!(short.fraction(), 0.0, "nothing to scroll");
}

#[test]
fn sampler_falls_back_to_clock_signal() {
    let t0 = Instant::now();
    let act = ActivityTracker::new(t0);
    let doc = ScrollDoc::new(120.0, 20.0);

    let mut failing = SignalSampler::with_probe(Some(Box::new(StubProbe(None))), 10.0);
    let r = failing.sample_at(t0, &act, &doc, 12, 0);
    assert!((r.pressure_ratio - 0.5).abs() < 1e-6);
    assert_eq!(r.daypart, Daypart::Day);

    let mut clock_only = SignalSampler::new(PressureSource::Clock, 10.0);
    assert_eq!(clock_only.source_label(), "clock");
    let r = clock_only.sample_at(t0, &act, &doc, 22, 0);
    assert!((r.pressure_ratio - 0.5).abs() < 1e-6);
    assert_eq!(r.daypart, Daypart::Night);
}

#[test]
fn sampler_uses_probe_when_available() {
    let t0 = Instant::now();
    let act = ActivityTracker::new(t0);
    let mut doc = ScrollDoc::new(120.0, 20.0);
    doc.to_end();

    let mut sampler = SignalSampler::with_probe(Some(Box::new(StubProbe(Some(0.8)))), 10.0);
    assert_eq!(sampler.source_label(), "stub");
    let r = sampler.sample_at(t0 + Duration::from_secs(20), &act, &doc, 9, 30);
    assert!((r.pressure_ratio - 0.8).abs() < 1e-6);
    assert_eq!(r.idle_factor, 1.0);
    assert_eq!(r.scroll_fraction, 1.0);
}
