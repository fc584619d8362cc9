use crate::paint::Viewport;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::{Duration, Instant};

/// Second click inside this window (and near the first) counts as a double click.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(350);
/// Cells the pointer may wander between the two clicks of a double click.
const DOUBLE_CLICK_SLOP: u16 = 2;
const WHEEL_LINES: f32 = 3.0;
const PAGE_LINES: f32 = 10.0;

/// What the lamp and its chrome should do in response to one terminal event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LampInput {
    /// Any user event; resets the idle timer.
    Activity,
    Primary { x: f32, y: f32 },
    OutsideClick,
    Burst,
    DragStart,
    DragMove,
    DragEnd,
    Scroll(f32),
    ScrollHome,
    ScrollEnd,
    ToggleMinimize,
    ToggleHud,
    ToggleHelp,
    TogglePause,
    Quit,
}

/// Cell coordinates to lamp units for the current layout.
#[derive(Debug, Clone, Copy)]
pub struct PointerMap {
    pub viewport: Viewport,
    pub cell_pixels: (usize, usize),
    pub visual_rows: u16,
}

impl PointerMap {
    pub fn to_lamp(&self, col: u16, row: u16) -> Option<(f32, f32)> {
        if row >= self.visual_rows {
            return None;
        }
        let (cw, ch) = self.cell_pixels;
        let px = (col as f32 + 0.5) * cw as f32;
        let py = (row as f32 + 0.5) * ch as f32;
        self.viewport.to_lamp(px, py)
    }
}

#[derive(Debug, Default)]
pub struct InteractionRouter {
    last_click: Option<(Instant, u16, u16)>,
    pressed: bool,
    dragging: bool,
}

impl InteractionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn route(&mut self, event: &Event, now: Instant, map: &PointerMap) -> Vec<LampInput> {
        match event {
            Event::Key(key) => route_key(key),
            Event::Mouse(mouse) => self.route_mouse(mouse, now, map),
            _ => Vec::new(),
        }
    }

    fn route_mouse(&mut self, m: &MouseEvent, now: Instant, map: &PointerMap) -> Vec<LampInput> {
        let mut out = vec![LampInput::Activity];
        match m.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pressed = true;
                self.dragging = false;
            }
            MouseEventKind::Drag(MouseButton::Left) if self.pressed => {
                if self.dragging {
                    out.push(LampInput::DragMove);
                } else {
                    self.dragging = true;
                    out.push(LampInput::DragStart);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let was_pressed = std::mem::take(&mut self.pressed);
                if std::mem::take(&mut self.dragging) {
                    // The release that ends a drag is not a click.
                    out.push(LampInput::DragEnd);
                } else if was_pressed {
                    out.push(self.click(m.column, m.row, now, map));
                }
            }
            MouseEventKind::Down(MouseButton::Right) => out.push(LampInput::Burst),
            MouseEventKind::ScrollUp => out.push(LampInput::Scroll(-WHEEL_LINES)),
            MouseEventKind::ScrollDown => out.push(LampInput::Scroll(WHEEL_LINES)),
            _ => {}
        }
        out
    }

    /// Only two quick clicks that both land on the lamp count as a double
    /// click; anything off the lamp wobbles and forgets the last click.
    fn click(&mut self, col: u16, row: u16, now: Instant, map: &PointerMap) -> LampInput {
        let Some((x, y)) = map.to_lamp(col, row) else {
            self.last_click = None;
            return LampInput::OutsideClick;
        };
        let double = self.last_click.is_some_and(|(at, c, r)| {
            now.saturating_duration_since(at) <= DOUBLE_CLICK_WINDOW
                && c.abs_diff(col) <= DOUBLE_CLICK_SLOP
                && r.abs_diff(row) <= DOUBLE_CLICK_SLOP
        });
        if double {
            self.last_click = None;
            return LampInput::Burst;
        }
        self.last_click = Some((now, col, row));
        LampInput::Primary { x, y }
    }
}

fn route_key(key: &KeyEvent) -> Vec<LampInput> {
    if key.kind == KeyEventKind::Release {
        return Vec::new();
    }
    let action = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(LampInput::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(LampInput::Quit),
        KeyCode::Char('m') => Some(LampInput::ToggleMinimize),
        KeyCode::Char('i') => Some(LampInput::ToggleHud),
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::F(1) => Some(LampInput::ToggleHelp),
        KeyCode::Char(' ') => Some(LampInput::TogglePause),
        KeyCode::Char('b') => Some(LampInput::Burst),
        KeyCode::Up => Some(LampInput::Scroll(-1.0)),
        KeyCode::Down => Some(LampInput::Scroll(1.0)),
        KeyCode::PageUp => Some(LampInput::Scroll(-PAGE_LINES)),
        KeyCode::PageDown => Some(LampInput::Scroll(PAGE_LINES)),
        KeyCode::Home => Some(LampInput::ScrollHome),
        KeyCode::End => Some(LampInput::ScrollEnd),
        _ => None,
    };
    let mut out = vec![LampInput::Activity];
    out.extend(action);
    out
}
