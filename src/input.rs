//! Key bindings and pointer state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Pause,
    Clear,
    None,
}

/// Map key event to action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') | KeyCode::Char(' ') => Action::Pause,
        KeyCode::Char('c') => Action::Clear,
        _ => Action::None,
    }
}

/// Pointer state. Pressing and releasing the left button each flip `active`;
/// movement while active pours sand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pointer {
    pub active: bool,
}

impl Pointer {
    /// Feed one mouse event. Returns the surface pixel to drop a grain at, if any.
    /// `canvas` is the terminal area the surface occupies; events outside it are dropped.
    pub fn handle(&mut self, event: MouseEvent, canvas: Rect) -> Option<(f64, f64)> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Up(MouseButton::Left) => {
                self.active = !self.active;
                None
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved if self.active => {
                cell_to_pixel(event.column, event.row, canvas)
            }
            _ => None,
        }
    }
}

/// Terminal cell to surface pixel. Each cell row holds two pixel rows; the upper one is used.
pub fn cell_to_pixel(column: u16, row: u16, canvas: Rect) -> Option<(f64, f64)> {
    let inside = column >= canvas.x
        && column < canvas.x + canvas.width
        && row >= canvas.y
        && row < canvas.y + canvas.height;
    inside.then(|| {
        (
            f64::from(column - canvas.x),
            f64::from(row - canvas.y) * 2.0,
        )
    })
}
