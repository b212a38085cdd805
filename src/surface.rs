//! Drawing surface: the simulation clears it and fills rectangles; the terminal shows it.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

/// Anything the simulation can paint a frame onto.
pub trait Surface {
    /// Width and height in pixels. May change between frames.
    fn size(&self) -> (u32, u32);

    /// Erase the whole surface.
    fn clear(&mut self);

    /// Fill the axis-aligned rectangle `[x, x + w) x [y, y + h)` with `color`.
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color);
}

/// Off-screen pixel buffer shown with upper half blocks (`▀`):
/// each terminal cell carries two vertical pixels.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: u16,
    height: u16,
    /// Row-major; `None` shows the background.
    pixels: Vec<Option<Color>>,
    background: Color,
}

impl PixelCanvas {
    /// Canvas covering `cols` x `rows` terminal cells (`cols` x `2 * rows` pixels).
    pub fn new(cols: u16, rows: u16, background: Color) -> Self {
        let height = rows.saturating_mul(2);
        Self {
            width: cols,
            height,
            pixels: vec![None; cols as usize * height as usize],
            background,
        }
    }

    /// Match the canvas to a new terminal area. Contents are dropped when the size changes.
    /// Returns true if the size changed.
    pub fn resize(&mut self, cols: u16, rows: u16) -> bool {
        let height = rows.saturating_mul(2);
        if cols == self.width && height == self.height {
            return false;
        }
        self.width = cols;
        self.height = height;
        self.pixels = vec![None; cols as usize * height as usize];
        true
    }

    #[inline]
    pub fn pixel(&self, x: u16, y: u16) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

/// Pixels whose centres fall inside `[start, start + len)`, clamped to `[0, limit)`.
/// A span narrower than a pixel still covers the pixel under its midpoint.
fn pixel_span(start: f64, len: f64, limit: u16) -> std::ops::Range<u16> {
    let limit_f = f64::from(limit);
    let lo = (start - 0.5).ceil().clamp(0.0, limit_f);
    let hi = (start + len - 0.5).ceil().clamp(0.0, limit_f);
    if hi > lo {
        return lo as u16..hi as u16;
    }
    let mid = (start + len / 2.0).floor();
    if mid >= 0.0 && mid < limit_f {
        mid as u16..mid as u16 + 1
    } else {
        0..0
    }
}

impl Surface for PixelCanvas {
    fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn clear(&mut self) {
        self.pixels.fill(None);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let xs = pixel_span(x, w, self.width);
        for py in pixel_span(y, h, self.height) {
            let row = py as usize * self.width as usize;
            for px in xs.clone() {
                self.pixels[row + px as usize] = Some(color);
            }
        }
    }
}

impl Widget for &PixelCanvas {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cols = self.width.min(area.width);
        let rows = (self.height / 2).min(area.height);
        for ty in 0..rows {
            for tx in 0..cols {
                let top = self.pixel(tx, ty * 2).unwrap_or(self.background);
                let bottom = self.pixel(tx, ty * 2 + 1).unwrap_or(self.background);
                buf[(area.x + tx, area.y + ty)]
                    .set_symbol("▀")
                    .set_style(Style::default().fg(top).bg(bottom));
            }
        }
    }
}
