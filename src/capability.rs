use crate::config::{PainterMode, RendererMode};
use crate::paint::PainterKind;

/// Outcome of the one-time terminal probe. Nothing downstream re-checks.
#[derive(Debug, Clone)]
pub struct CapabilityReport {
    pub auto_probe: bool,
    pub requested_renderer: RendererMode,
    pub requested_painter: PainterMode,
    pub renderer: RendererMode,
    pub painter: PainterKind,
    pub truecolor: bool,
    notes: Vec<String>,
}

impl CapabilityReport {
    pub fn renderer_changed(&self) -> bool {
        self.renderer != self.requested_renderer
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn status_label(&self) -> String {
        let painter = self.painter.label();
        if !self.auto_probe {
            return format!("off (renderer={:?}, painter={painter})", self.renderer);
        }
        if self.renderer_changed() {
            return format!(
                "fallback ren {:?}->{:?}, painter={painter}",
                self.requested_renderer, self.renderer
            );
        }
        format!("ok ren={:?}, painter={painter}", self.renderer)
    }
}

pub fn probe_runtime(
    requested_renderer: RendererMode,
    requested_painter: PainterMode,
    auto_probe: bool,
) -> CapabilityReport {
    probe_runtime_with(requested_renderer, requested_painter, auto_probe, |key| {
        std::env::var(key).ok()
    })
}

/// Probe against an arbitrary environment lookup.
pub fn probe_runtime_with(
    requested_renderer: RendererMode,
    requested_painter: PainterMode,
    auto_probe: bool,
    env: impl Fn(&str) -> Option<String>,
) -> CapabilityReport {
    let truecolor = truecolor_available(&env);
    let mut report = CapabilityReport {
        auto_probe,
        requested_renderer,
        requested_painter,
        renderer: requested_renderer,
        painter: PainterKind::Raster,
        truecolor,
        notes: Vec::new(),
    };

    report.painter = match requested_painter {
        PainterMode::Raster => PainterKind::Raster,
        PainterMode::Static => PainterKind::Static,
        PainterMode::Auto if !auto_probe || truecolor => PainterKind::Raster,
        PainterMode::Auto => {
            report.push_note("no truecolor support detected; using static lamp image");
            PainterKind::Static
        }
    };

    if !auto_probe {
        report.push_note("capability probe disabled by --auto-probe=false");
        return report;
    }

    if requested_renderer == RendererMode::Kitty && !kitty_graphics_available(&env) {
        report.renderer = RendererMode::HalfBlock;
        report.push_note("kitty graphics unavailable in this terminal; falling back to half-block renderer");
    }

    if report.notes.is_empty() {
        report.push_note("probe selected requested renderer and painter with no fallback");
    }
    report
}

fn flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn lower(env: &impl Fn(&str) -> Option<String>, key: &str) -> String {
    env(key).unwrap_or_default().to_ascii_lowercase()
}

fn kitty_graphics_available(env: &impl Fn(&str) -> Option<String>) -> bool {
    if let Some(forced) = env("LAVA_BLOB_FORCE_KITTY").as_deref().and_then(flag) {
        return forced;
    }
    if env("KITTY_WINDOW_ID").is_some() {
        return true;
    }
    if lower(env, "TERM").contains("kitty") {
        return true;
    }
    let term_program = lower(env, "TERM_PROGRAM");
    term_program.contains("ghostty") || term_program.contains("kitty")
}

fn truecolor_available(env: &impl Fn(&str) -> Option<String>) -> bool {
    if let Some(forced) = env("LAVA_BLOB_FORCE_RASTER").as_deref().and_then(flag) {
        return forced;
    }
    let colorterm = lower(env, "COLORTERM");
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return true;
    }
    let term = lower(env, "TERM");
    if ["truecolor", "24bit", "direct", "kitty", "ghostty", "wezterm", "alacritty"]
        .iter()
        .any(|t| term.contains(t))
    {
        return true;
    }
    let term_program = lower(env, "TERM_PROGRAM");
    ["iterm", "wezterm", "ghostty", "vscode", "kitty"]
        .iter()
        .any(|t| term_program.contains(t))
}
