mod braille;
mod halfblock;
mod kitty;

pub use braille::BrailleRenderer;
pub use halfblock::HalfBlockRenderer;
pub use kitty::KittyRenderer;

use crate::config::RendererMode;
use std::io::Write;

/// One composed frame: lamp pixels for the top `visual_rows`, then HUD text.
pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    pub visual_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    pub hud: &'a str,
    pub hud_rows: u16,
    pub overlay: Option<&'a str>,
    pub sync_updates: bool,
}

impl Frame<'_> {
    /// True when the pixel buffer matches the advertised grid for `cell`
    /// pixels per terminal cell.
    fn fits(&self, cell: (usize, usize)) -> bool {
        let cols = self.term_cols as usize;
        let rows = self.visual_rows as usize;
        cols > 0
            && rows > 0
            && self.pixel_width == cols * cell.0
            && self.pixel_height == rows * cell.1
            && self.pixels_rgba.len() >= self.pixel_width * self.pixel_height * 4
    }

    fn rgb(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let i = (y * self.pixel_width + x) * 4;
        (self.pixels_rgba[i], self.pixels_rgba[i + 1], self.pixels_rgba[i + 2])
    }
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    /// Pixels per terminal cell, horizontally and vertically.
    fn cell_pixels(&self) -> (usize, usize);
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}

pub fn make_renderer(mode: RendererMode) -> Box<dyn Renderer> {
    match mode {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Braille => Box::new(BrailleRenderer::new()),
        RendererMode::Kitty => Box::new(KittyRenderer::new()),
    }
}

/// Skips redundant SGR colour escapes between neighbouring cells.
#[derive(Default)]
struct SgrCache {
    fg: Option<(u8, u8, u8)>,
    bg: Option<(u8, u8, u8)>,
}

impl SgrCache {
    fn reset(&mut self) {
        self.fg = None;
        self.bg = None;
    }

    fn set(&mut self, out: &mut dyn Write, fg: (u8, u8, u8), bg: (u8, u8, u8)) -> std::io::Result<()> {
        if self.fg != Some(fg) {
            write!(out, "\x1b[38;2;{};{};{}m", fg.0, fg.1, fg.2)?;
            self.fg = Some(fg);
        }
        if self.bg != Some(bg) {
            write!(out, "\x1b[48;2;{};{};{}m", bg.0, bg.1, bg.2)?;
            self.bg = Some(bg);
        }
        Ok(())
    }
}

fn begin_sync(frame: &Frame<'_>, out: &mut dyn Write) -> std::io::Result<()> {
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026h")?;
    }
    Ok(())
}

fn end_sync(frame: &Frame<'_>, out: &mut dyn Write) -> std::io::Result<()> {
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026l")?;
    }
    out.flush()
}

/// Cell grid painter shared by the text renderers: homes the cursor, turns
/// autowrap off for full-width rows and writes HUD plus overlay afterwards.
fn render_cells(
    frame: &Frame<'_>,
    out: &mut dyn Write,
    cache: &mut SgrCache,
    mut cell: impl FnMut(usize, usize) -> ((u8, u8, u8), (u8, u8, u8), char),
) -> anyhow::Result<()> {
    let cols = frame.term_cols as usize;
    let rows = frame.visual_rows as usize;

    begin_sync(frame, out)?;
    out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")?;
    cache.reset();
    let mut glyph = [0u8; 4];
    for row in 0..rows {
        for col in 0..cols {
            let (fg, bg, ch) = cell(col, row);
            cache.set(out, fg, bg)?;
            out.write_all(ch.encode_utf8(&mut glyph).as_bytes())?;
        }
        out.write_all(b"\r\n")?;
    }

    write_hud(out, frame)?;
    if let Some(text) = frame.overlay {
        draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
    }
    out.write_all(b"\x1b[?7h")?;
    end_sync(frame, out)?;
    Ok(())
}

fn write_hud(out: &mut dyn Write, frame: &Frame<'_>) -> std::io::Result<()> {
    let cols = frame.term_cols as usize;
    let first = frame.visual_rows as usize + 1;
    let mut lines = frame.hud.lines();
    for i in 0..frame.hud_rows as usize {
        write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", first + i)?;
        if let Some(line) = lines.next() {
            let clipped: String = line.chars().take(cols).collect();
            out.write_all(b"\x1b[38;2;200;190;220m")?;
            out.write_all(clipped.as_bytes())?;
            out.write_all(b"\x1b[0m")?;
        }
    }
    Ok(())
}

/// Centred text box over a dimmed screen. The first line is the title.
pub fn draw_overlay_popup(
    out: &mut dyn Write,
    term_cols: u16,
    term_rows: u16,
    text: &str,
) -> anyhow::Result<()> {
    let cols = term_cols as usize;
    let rows = term_rows as usize;
    if text.trim().is_empty() || cols < 8 || rows < 4 {
        return Ok(());
    }

    let max_inner = cols.saturating_sub(6).max(1);
    let lines = wrap_lines(text, max_inner);
    if lines.is_empty() {
        return Ok(());
    }

    let inner = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(1)
        .clamp(1, max_inner);
    let box_w = (inner + 4).min(cols.saturating_sub(2)).max(4);
    let inner = box_w - 4;
    let body_h = lines.len().min(rows.saturating_sub(3).max(1));
    let box_h = (body_h + 2).min(rows.saturating_sub(1)).max(3);
    let left = (cols - box_w) / 2 + 1;
    let top = rows.saturating_sub(box_h) / 2 + 1;

    let rule = "-".repeat(box_w - 2);
    out.write_all(b"\x1b[0m\x1b[38;2;226;218;240m\x1b[48;2;8;4;14m")?;
    for row in 1..=rows {
        write!(out, "\x1b[{row};1H\x1b[2K")?;
    }
    write!(out, "\x1b[{top};{left}H+{rule}+")?;
    for (i, line) in lines.iter().take(body_h).enumerate() {
        let row = top + 1 + i;
        write!(out, "\x1b[{row};{left}H| {:inner$} |", "")?;
        if i == 0 {
            write!(out, "\x1b[{row};{}H\x1b[1m\x1b[38;2;255;170;120m{line}\x1b[22m\x1b[38;2;226;218;240m", left + 2)?;
        } else {
            write!(out, "\x1b[{row};{}H{line}", left + 2)?;
        }
    }
    write!(out, "\x1b[{};{left}H+{rule}+", top + box_h - 1)?;
    out.write_all(b"\x1b[0m")?;
    Ok(())
}

fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        if raw.is_empty() {
            lines.push(String::new());
            continue;
        }
        let chars: Vec<char> = raw.chars().collect();
        for chunk in chars.chunks(width.max(1)) {
            lines.push(chunk.iter().collect());
        }
    }
    lines
}
