use crate::capability::{probe_runtime, CapabilityReport};
use crate::config::{Config, RendererMode};
use crate::input::{InteractionRouter, LampInput, PointerMap};
use crate::paint::{make_painter, Canvas, Painter, Viewport};
use crate::prefs::{prefs_storage_path, LampPrefs};
use crate::render::{make_renderer, Frame};
use crate::schedule::{FpsCounter, FrameClock, ResampleTimer};
use crate::signals::{ActivityTracker, ScrollDoc, SignalReading, SignalSampler};
use crate::sim::Lamp;
use crate::terminal::TerminalGuard;
use anyhow::Context;
use crossterm::event::{self, Event};
use std::io::BufWriter;
use std::time::{Duration, Instant};

/// Receives the chrome state whenever it changes and once more at teardown.
pub type SavePrefs = Box<dyn FnMut(&LampPrefs)>;

/// Everything one lamp session owns, minus the terminal itself.
pub struct App {
    lamp: Lamp,
    painter: Box<dyn Painter>,
    canvas: Canvas,
    painted: Option<(usize, usize, bool)>,
    sampler: SignalSampler,
    activity: ActivityTracker,
    scroll: ScrollDoc,
    clock: FrameClock,
    timer: ResampleTimer,
    router: InteractionRouter,
    prefs: LampPrefs,
    save_prefs: SavePrefs,
    last_reading: Option<SignalReading>,
    paused: bool,
    show_help: bool,
    quit: bool,
    torn_down: bool,
}

impl App {
    pub fn new(
        mut lamp: Lamp,
        painter: Box<dyn Painter>,
        sampler: SignalSampler,
        prefs: LampPrefs,
        save_prefs: SavePrefs,
        now: Instant,
    ) -> Self {
        let mut clock = FrameClock::new();
        if prefs.minimized {
            lamp.set_minimized(true);
            clock.suspend();
        }
        let mut timer = ResampleTimer::new(lamp.config().resample_interval);
        timer.start(now);
        let scroll = ScrollDoc::new(lamp.config().scroll_extent, 0.0);
        Self {
            lamp,
            painter,
            canvas: Canvas::new(0, 0),
            painted: None,
            sampler,
            activity: ActivityTracker::new(now),
            scroll,
            clock,
            timer,
            router: InteractionRouter::new(),
            prefs,
            save_prefs,
            last_reading: None,
            paused: false,
            show_help: false,
            quit: false,
            torn_down: false,
        }
    }

    pub fn lamp(&self) -> &Lamp {
        &self.lamp
    }

    pub fn prefs(&self) -> LampPrefs {
        self.prefs
    }

    pub fn scroll(&self) -> &ScrollDoc {
        &self.scroll
    }

    pub fn timer(&self) -> &ResampleTimer {
        &self.timer
    }

    pub fn last_reading(&self) -> Option<&SignalReading> {
        self.last_reading.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn set_scroll_viewport(&mut self, rows: f32) {
        self.scroll.set_viewport(rows);
    }

    pub fn pointer_map(&self, pixel_width: usize, pixel_height: usize, cell_pixels: (usize, usize), visual_rows: u16) -> PointerMap {
        PointerMap {
            viewport: Viewport::for_scene(&self.lamp.scene(), pixel_width, pixel_height),
            cell_pixels,
            visual_rows,
        }
    }

    /// Route a raw terminal event through the interaction router.
    pub fn handle_event(&mut self, ev: &Event, now: Instant, map: &PointerMap) {
        for input in self.router.route(ev, now, map) {
            self.handle(input, now);
        }
    }

    pub fn handle(&mut self, input: LampInput, now: Instant) {
        match input {
            LampInput::Activity => self.activity.touch(now),
            LampInput::Primary { x, y } => {
                let touched = self.lamp.primary(x, y);
                log::debug!("primary at ({x:.1}, {y:.1}) touched {touched} blobs");
            }
            LampInput::OutsideClick => self.lamp.outside_click(),
            LampInput::Burst => {
                self.lamp.burst();
                log::debug!("burst; hue reset to {:.1}", self.lamp.hue().current());
                self.sync_minimized();
            }
            LampInput::DragStart => self.lamp.drag_start(),
            LampInput::DragMove => self.lamp.drag_move(),
            LampInput::DragEnd => self.lamp.drag_end(),
            LampInput::Scroll(delta) => {
                self.scroll.scroll_by(delta);
                self.retarget_hue(now);
            }
            LampInput::ScrollHome => {
                self.scroll.to_start();
                self.retarget_hue(now);
            }
            LampInput::ScrollEnd => {
                self.scroll.to_end();
                self.retarget_hue(now);
            }
            LampInput::ToggleMinimize => {
                let on = !self.lamp.is_minimized();
                self.lamp.set_minimized(on);
                self.sync_minimized();
            }
            LampInput::ToggleHud => {
                self.prefs.show_hud = !self.prefs.show_hud;
                (self.save_prefs)(&self.prefs);
            }
            LampInput::ToggleHelp => self.show_help = !self.show_help,
            LampInput::TogglePause => {
                self.paused = !self.paused;
                self.sync_clock();
            }
            LampInput::Quit => self.quit = true,
        }
    }

    /// Scrolling moves the target hue right away; pressure history only
    /// grows on the resample timer.
    fn retarget_hue(&mut self, now: Instant) {
        let base = match self.last_reading {
            Some(r) => r,
            None => self.sampler.sample(now, &self.activity, &self.scroll),
        };
        let reading = SignalReading::new(
            base.pressure_ratio,
            self.activity
                .idle_factor(now, self.lamp.config().idle_threshold_secs),
            self.scroll.fraction(),
            base.daypart,
        );
        let target = self.lamp.retarget(&reading);
        log::debug!("scroll {:.0}% retargets hue to {target:.1}", reading.scroll_fraction * 100.0);
    }

    fn sync_minimized(&mut self) {
        let minimized = self.lamp.is_minimized();
        if minimized != self.prefs.minimized {
            self.prefs.minimized = minimized;
            log::info!("lamp {}", if minimized { "minimized" } else { "restored" });
            (self.save_prefs)(&self.prefs);
        }
        self.sync_clock();
    }

    fn sync_clock(&mut self) {
        let frozen = self.paused || self.lamp.is_minimized();
        if frozen && !self.clock.is_suspended() {
            self.clock.suspend();
        } else if !frozen && self.clock.is_suspended() {
            self.clock.resume();
        }
    }

    /// Per-frame work: resample when due, then one simulation step.
    pub fn frame(&mut self, now: Instant) -> bool {
        if self.timer.poll(now) {
            let reading = self.sampler.sample(now, &self.activity, &self.scroll);
            self.lamp.resample(&reading);
            self.last_reading = Some(reading);
        }
        let dt = self.clock.tick(now);
        if self.clock.is_suspended() {
            return false;
        }
        self.lamp.step(dt)
    }

    /// Painters that ignore motion are only re-run when the canvas size or
    /// the minimized band changes.
    pub fn paint(&mut self, width: usize, height: usize) -> &Canvas {
        let key = (width, height, self.lamp.is_minimized());
        if self.painter.animated() || self.painted != Some(key) {
            self.canvas.ensure_size(width, height);
            self.painter.paint(&self.lamp.scene(), &mut self.canvas);
            self.painted = Some(key);
        }
        &self.canvas
    }

    pub fn hud_text(&self, now: Instant, cols: usize, fps: f32, renderer: &str, probe: &str) -> String {
        let scene = self.lamp.scene();
        let target = self.lamp.hue().target();
        let (mem, daypart) = self
            .last_reading
            .map_or((0.0, "--"), |r| (r.pressure_ratio * 100.0, r.daypart.label()));
        let state = if self.lamp.is_minimized() {
            "minimized"
        } else if self.paused {
            "paused"
        } else {
            "running"
        };
        let lines = vec![
            format!(
                "Memory: {:.0}% | Hue: {:.0} -> {:.0} | Idle: {:.1}s | Scroll: {:.0}% | {} | FPS: {:>4.1}",
                mem,
                scene.hue,
                target,
                self.activity.idle_secs(now),
                self.scroll.fraction() * 100.0,
                daypart,
                fps,
            ),
            format!(
                "Painter: {} | Renderer: {} | Pressure: {} | Probe: {} | {}",
                self.painter.name(),
                renderer,
                self.sampler.source_label(),
                probe,
                state,
            ),
            "Keys: click ripple | dbl/right click or b burst | drag stir | wheel/PgUp/PgDn scroll | m minimize | space pause | i HUD | ? help | q quit".to_string(),
        ];
        lines
            .iter()
            .flat_map(|l| hard_wrap_line(l, cols.max(1)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Stops the resample timer, clears transient effects and hands the
    /// final prefs to the save callback. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.timer.cancel();
        self.lamp.teardown();
        (self.save_prefs)(&self.prefs);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.teardown();
    }
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let lamp_cfg = cfg.lamp_config().context("load lamp configuration")?;
    let report = probe_runtime(cfg.renderer, cfg.painter, cfg.auto_probe);
    log_report(&report);

    let prefs_path = if cfg.no_prefs {
        None
    } else {
        cfg.prefs.clone().or_else(prefs_storage_path)
    };
    let prefs = LampPrefs::load(prefs_path.as_deref()).unwrap_or_else(|err| {
        log::warn!("ignoring unreadable prefs: {err}");
        LampPrefs::default()
    });
    let save_prefs: SavePrefs = Box::new(move |p: &LampPrefs| {
        if let Err(err) = p.save(prefs_path.as_deref()) {
            log::warn!("failed to save prefs: {err}");
        }
    });

    let _term = TerminalGuard::new(report.renderer == RendererMode::Kitty)?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut renderer = make_renderer(report.renderer);
    let cell = renderer.cell_pixels();
    let painter = make_painter(report.painter, &lamp_cfg);
    let sampler = SignalSampler::new(cfg.pressure, lamp_cfg.idle_threshold_secs);
    log::info!(
        "lamp {}x{} with {} blobs, painter={}, renderer={}, pressure={}",
        lamp_cfg.width,
        lamp_cfg.height,
        lamp_cfg.blob_count,
        painter.name(),
        renderer.name(),
        sampler.source_label()
    );

    let start = Instant::now();
    let mut app = App::new(Lamp::new(lamp_cfg), painter, sampler, prefs, save_prefs, start);

    let mut size = TerminalGuard::usable_size()?;

    let probe_label = report.status_label();
    let mut fps = FpsCounter::new(start);
    let mut hud_rows = 0u16;
    let frame_budget = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);

    while !app.should_quit() {
        let now = Instant::now();
        let visual_rows = size.1.saturating_sub(hud_rows).max(1);
        let (w, h) = (size.0 as usize * cell.0, visual_rows as usize * cell.1);
        app.set_scroll_viewport(visual_rows as f32);
        let map = app.pointer_map(w, h, cell, visual_rows);

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Resize(c, r) => size = (c, r),
                ev => app.handle_event(&ev, now, &map),
            }
        }
        if app.should_quit() {
            break;
        }
        // Resize events can be missed in some terminals.
        let current = crossterm::terminal::size()?;
        if current != size {
            size = current;
        }

        app.frame(now);

        let (term_cols, term_rows) = size;
        let hud = if app.prefs().show_hud {
            app.hud_text(now, term_cols as usize, fps.fps(), renderer.name(), &probe_label)
        } else {
            String::new()
        };
        hud_rows = hud_rows_for_text(term_rows, app.prefs().show_hud, &hud);
        let visual_rows = term_rows.saturating_sub(hud_rows).max(1);
        let (w, h) = (term_cols as usize * cell.0, visual_rows as usize * cell.1);

        let overlay = app.show_help().then(help_popup_text);
        let sync_updates = cfg.sync_updates;
        let pixels = app.paint(w, h);
        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: pixels.pixels(),
            hud: &hud,
            hud_rows,
            overlay,
            sync_updates,
        };
        renderer.render(&frame, &mut out).context("write frame")?;
        fps.tick(now);

        let elapsed = now.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
    }

    app.teardown();
    log::info!("session ended");
    Ok(())
}

fn log_report(report: &CapabilityReport) {
    log::info!("capability probe: {}", report.status_label());
    for note in report.notes() {
        log::info!("capability: {note}");
    }
}

fn hud_rows_for_text(term_rows: u16, show_hud: bool, hud: &str) -> u16 {
    if !show_hud {
        return 0;
    }
    let wanted = hud.lines().count() as u16;
    wanted.min(term_rows.saturating_sub(1))
}

fn hard_wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars.chunks(width).map(|c| c.iter().collect()).collect()
}

fn help_popup_text() -> &'static str {
    "Lava Lamp\n\
click  ripple + push nearby blobs, recolour them\n\
double click / right click / b  burst: launch every blob, new hue\n\
drag  stir; release morphs blob sizes\n\
wheel / PgUp / PgDn / Home / End  scroll (shifts hue toward purple)\n\
m  minimize / restore\n\
space  pause\n\
i  show/hide HUD\n\
? or h or F1  toggle this help\n\
q or esc  quit\n\
\n\
Hue follows memory pressure, idle time, scroll position and time of day."
}
