use crate::render::{begin_sync, draw_overlay_popup, end_sync, write_hud, Frame, Renderer};
use anyhow::Context;
use base64::Engine;
use std::io::Write;

/// 3072 raw bytes encode to exactly 4096 base64 bytes, the protocol's chunk limit.
const RAW_CHUNK: usize = 3 * 1024;

/// Kitty graphics protocol with direct (in-band base64) transmission. One
/// image id is reused for the whole session so the terminal replaces the
/// previous frame in place.
pub struct KittyRenderer {
    image_id: u32,
    b64_buf: Vec<u8>,
    overlay_visible_last: bool,
    last_hud_rows: u16,
}

impl Default for KittyRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl KittyRenderer {
    pub fn new() -> Self {
        Self {
            image_id: 1,
            b64_buf: Vec::new(),
            overlay_visible_last: false,
            last_hud_rows: 0,
        }
    }
}

impl Renderer for KittyRenderer {
    fn name(&self) -> &'static str {
        "kitty"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (2, 4)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        if !frame.fits(self.cell_pixels()) {
            return Ok(());
        }
        begin_sync(frame, out)?;

        if let Some(text) = frame.overlay {
            // Images sit above text; drop it so the popup is readable.
            write!(out, "\x1b_Ga=d,d=I,i={}\x1b\\", self.image_id)?;
            clear_rows(out, frame.term_rows as usize)?;
            write_hud(out, frame)?;
            draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
            self.overlay_visible_last = true;
            self.last_hud_rows = frame.hud_rows;
            end_sync(frame, out)?;
            return Ok(());
        }

        out.write_all(b"\x1b[H")?;
        write_direct_rgba(out, frame, self.image_id, &mut self.b64_buf)?;

        if frame.hud_rows != self.last_hud_rows {
            clear_rows(out, frame.term_rows as usize)?;
        } else if self.overlay_visible_last {
            clear_rows(out, frame.visual_rows as usize)?;
        }
        write_hud(out, frame)?;

        self.overlay_visible_last = false;
        self.last_hud_rows = frame.hud_rows;
        end_sync(frame, out)?;
        Ok(())
    }
}

fn write_direct_rgba(
    out: &mut dyn Write,
    frame: &Frame<'_>,
    image_id: u32,
    b64_buf: &mut Vec<u8>,
) -> anyhow::Result<()> {
    let len = frame.pixel_width * frame.pixel_height * 4;
    let rgba = &frame.pixels_rgba[..len];
    let total = rgba.len().div_ceil(RAW_CHUNK);

    for (n, chunk) in rgba.chunks(RAW_CHUNK).enumerate() {
        let b64_len = chunk.len().div_ceil(3) * 4;
        if b64_buf.len() < b64_len {
            b64_buf.resize(b64_len, 0);
        }
        let written = base64::engine::general_purpose::STANDARD
            .encode_slice(chunk, &mut b64_buf[..b64_len])
            .context("base64 encode pixels")?;

        let more = n + 1 < total;
        if n == 0 {
            write!(
                out,
                "\x1b_Ga=T,f=32,s={},v={},t=d,i={},p=1,c={},r={},C=1,q=2,z=-1{};",
                frame.pixel_width,
                frame.pixel_height,
                image_id,
                frame.term_cols,
                frame.visual_rows,
                if more { ",m=1" } else { "" }
            )?;
        } else if more {
            out.write_all(b"\x1b_Gm=1;")?;
        } else {
            out.write_all(b"\x1b_Gm=0;")?;
        }
        out.write_all(&b64_buf[..written])?;
        out.write_all(b"\x1b\\")?;
    }
    Ok(())
}

fn clear_rows(out: &mut dyn Write, rows: usize) -> std::io::Result<()> {
    for row in 1..=rows {
        write!(out, "\x1b[{row};1H\x1b[0m\x1b[2K")?;
    }
    Ok(())
}
