//! Layout and drawing: sand canvas, status line, clear fade.

use crate::surface::PixelCanvas;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Rows reserved under the canvas for the status line.
const STATUS_HEIGHT: u16 = 1;

/// Duration of the fade to background before the grid is emptied.
const CLEAR_FADE_MS: u32 = 350;

const HELP: &str = "drag: pour  c: clear  p: pause  q: quit ";

/// Numbers shown in the status line.
#[derive(Debug, Clone, Copy)]
pub struct Status<'a> {
    pub perf: &'a str,
    pub grains: usize,
    pub moving: usize,
    pub frames: u64,
    pub dimension: usize,
    pub paused: bool,
}

/// Split the terminal into the canvas (top) and the status line (bottom).
pub fn layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(STATUS_HEIGHT)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Draw canvas and status line. While `clearing`, fades the canvas to the background
/// and keeps `clear_effect` / `clear_process_time` up to date.
pub fn draw(
    frame: &mut Frame,
    theme: &Theme,
    canvas: &PixelCanvas,
    canvas_area: Rect,
    status_area: Rect,
    status: Status<'_>,
    clearing: bool,
    clear_effect: &mut Option<Effect>,
    clear_process_time: &mut Option<Instant>,
    now: Instant,
) {
    frame.render_widget(canvas, canvas_area);
    draw_status(frame, theme, status_area, status);
    if clearing {
        apply_clear_effect(frame, theme, canvas_area, clear_effect, clear_process_time, now);
    }
}

fn draw_status(frame: &mut Frame, theme: &Theme, area: Rect, status: Status<'_>) {
    let base = Style::default().bg(theme.bg);
    let title = base.fg(theme.title).add_modifier(Modifier::BOLD);
    let fg = base.fg(theme.main_fg);
    let dim = base.fg(theme.inactive_fg);

    let mut spans = vec![
        Span::styled(" sandfall ", title),
        Span::styled(format!("{0}x{0} ", status.dimension), dim),
        Span::styled("avg frame ", fg),
        Span::styled(status.perf.to_string(), title),
        Span::styled(
            format!(
                "  grains {} ({} moving)  frame {}",
                status.grains, status.moving, status.frames
            ),
            fg,
        ),
    ];
    if status.paused {
        spans.push(Span::styled("  PAUSED", title));
    }

    let help_width = HELP.chars().count() as u16;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Fill(1), Constraint::Length(help_width)])
        .split(area);
    Paragraph::new(Line::from(spans))
        .style(base)
        .render(chunks[0], frame.buffer_mut());
    Paragraph::new(Line::from(Span::styled(HELP, dim)))
        .style(base)
        .render(chunks[1], frame.buffer_mut());
}

/// Create or advance the clear fade (TachyonFX: canvas fades to bg).
fn apply_clear_effect(
    frame: &mut Frame,
    theme: &Theme,
    area: Rect,
    clear_effect: &mut Option<Effect>,
    clear_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = clear_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *clear_process_time = Some(now);

    let effect = clear_effect.get_or_insert_with(|| {
        fx::fade_to(theme.bg, theme.bg, (CLEAR_FADE_MS, Interpolation::Linear)).with_area(area)
    });
    frame.render_effect(effect, area, TfxDuration::from_millis(delta_ms));
}
