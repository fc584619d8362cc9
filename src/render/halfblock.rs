use crate::render::{render_cells, Frame, Renderer, SgrCache};
use std::io::Write;

const UPPER_HALF: char = '\u{2580}';

/// Two vertically stacked pixels per cell: foreground on top, background below.
#[derive(Default)]
pub struct HalfBlockRenderer {
    sgr: SgrCache,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "half-block"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (1, 2)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        if !frame.fits(self.cell_pixels()) {
            return Ok(());
        }
        render_cells(frame, out, &mut self.sgr, |col, row| {
            let top = frame.rgb(col, row * 2);
            let bottom = frame.rgb(col, row * 2 + 1);
            (top, bottom, UPPER_HALF)
        })
    }
}
