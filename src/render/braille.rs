use crate::render::{render_cells, Frame, Renderer, SgrCache};
use std::io::Write;

/// Bit for each dot, row-major over the 2x4 cell.
const DOT_BITS: [u8; 8] = [0x01, 0x08, 0x02, 0x10, 0x04, 0x20, 0x40, 0x80];

/// 2x4 pixels per cell. Dots brighter than the cell's mid luma are lit with
/// their mean colour; the rest average into the background.
#[derive(Default)]
pub struct BrailleRenderer {
    sgr: SgrCache,
}

impl BrailleRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for BrailleRenderer {
    fn name(&self) -> &'static str {
        "braille"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (2, 4)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        if !frame.fits(self.cell_pixels()) {
            return Ok(());
        }
        render_cells(frame, out, &mut self.sgr, |col, row| {
            let mut rgb = [(0u8, 0u8, 0u8); 8];
            let mut lum = [0u16; 8];
            for (i, slot) in rgb.iter_mut().enumerate() {
                let px = frame.rgb(col * 2 + i % 2, row * 4 + i / 2);
                *slot = px;
                lum[i] = luma(px);
            }
            let lo = lum.iter().copied().min().unwrap_or(0);
            let hi = lum.iter().copied().max().unwrap_or(0);
            let threshold = (lo + hi) / 2;

            let mut bits = 0u8;
            let mut on = Mean::default();
            let mut off = Mean::default();
            for i in 0..8 {
                if lum[i] > threshold {
                    bits |= DOT_BITS[i];
                    on.add(rgb[i]);
                } else {
                    off.add(rgb[i]);
                }
            }

            if bits == 0 {
                let c = off.get().unwrap_or((0, 0, 0));
                return (c, c, ' ');
            }
            let fg = on.get().unwrap_or((0, 0, 0));
            let bg = off.get().unwrap_or(fg);
            let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
            (fg, bg, ch)
        })
    }
}

#[derive(Default)]
struct Mean {
    sum: [u32; 3],
    n: u32,
}

impl Mean {
    fn add(&mut self, (r, g, b): (u8, u8, u8)) {
        self.sum[0] += r as u32;
        self.sum[1] += g as u32;
        self.sum[2] += b as u32;
        self.n += 1;
    }

    fn get(&self) -> Option<(u8, u8, u8)> {
        (self.n > 0).then(|| {
            (
                (self.sum[0] / self.n) as u8,
                (self.sum[1] / self.n) as u8,
                (self.sum[2] / self.n) as u8,
            )
        })
    }
}

#[inline]
fn luma((r, g, b): (u8, u8, u8)) -> u16 {
    ((r as u32 * 54 + g as u32 * 183 + b as u32 * 19) >> 8) as u16
}
