use anyhow::Context;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    queue,
    terminal::{self, ClearType},
};
use std::io::{stdout, Stdout, Write};

/// Smallest grid the lamp plus one HUD row can use.
pub const MIN_COLS: u16 = 4;
pub const MIN_ROWS: u16 = 2;

/// Owns the interactive terminal session: raw mode, alternate screen,
/// hidden cursor and mouse reporting. Everything is undone on drop.
pub struct TerminalGuard {
    kitty_images: bool,
}

impl TerminalGuard {
    /// `kitty_images` also drops any lamp image still on screen at exit.
    pub fn new(kitty_images: bool) -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        // Built first so a failed step below still restores cooked mode.
        let guard = Self { kitty_images };

        let mut out = stdout();
        queue!(
            out,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            EnableMouseCapture
        )
        .context("prepare lamp screen")?;
        out.flush().context("flush terminal setup")?;
        Ok(guard)
    }

    pub fn stdout() -> Stdout {
        stdout()
    }

    /// Current size, rejected when too small to draw anything.
    pub fn usable_size() -> anyhow::Result<(u16, u16)> {
        let (cols, rows) = terminal::size().context("get terminal size")?;
        if cols < MIN_COLS || rows < MIN_ROWS {
            anyhow::bail!("terminal too small (need at least {MIN_COLS}x{MIN_ROWS}, got {cols}x{rows})");
        }
        Ok((cols, rows))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        if self.kitty_images {
            let _ = out.write_all(b"\x1b_Ga=d,d=A\x1b\\");
        }
        // Renderers may exit mid-frame with sync output or autowrap toggled.
        let _ = out.write_all(b"\x1b[?2026l\x1b[?7h\x1b[0m");
        let _ = queue!(
            out,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = out.flush();
        let _ = terminal::disable_raw_mode();
    }
}
