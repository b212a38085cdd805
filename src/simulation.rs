//! Simulation: owns the grid, runs one frame per `step`, places grains from pointer input.

use crate::clock::{Clock, MonotonicClock};
use crate::grain::Grain;
use crate::grid::Grid;
use crate::surface::Surface;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::style::Color;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// Largest accepted grid side; the grid holds `MAX_DIMENSION`² slots.
pub const MAX_DIMENSION: usize = 2048;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("grid dimension must be between 1 and {max}, got {0}", max = MAX_DIMENSION)]
    InvalidDimension(usize),
    #[error("palette must contain at least one colour")]
    EmptyPalette,
}

/// Receives the running average frame time once per frame.
pub trait MetricSink {
    fn report(&mut self, average_secs: f64);
}

/// Text readout of the average frame time, e.g. `0.000412 s`.
#[derive(Debug, Clone, Default)]
pub struct PerfReadout {
    text: String,
}

impl PerfReadout {
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl MetricSink for PerfReadout {
    fn report(&mut self, average_secs: f64) {
        self.text = format!("{average_secs:.6} s");
    }
}

/// Per-frame counts of what the fall rule did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub moved: usize,
}

pub struct Simulation {
    grid: Grid,
    palette: Vec<Color>,
    /// Grains placed so far; picks the next palette colour.
    placed: usize,
    frames: u64,
    /// Sum of all frame durations, for the running average.
    elapsed: Duration,
    last_frame: FrameStats,
    rng: StdRng,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("dimension", &self.grid.dimension())
            .field("palette", &self.palette.len())
            .field("placed", &self.placed)
            .field("frames", &self.frames)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Empty `dimension` x `dimension` grid, grains coloured round-robin from `palette`.
    pub fn new(dimension: usize, palette: Vec<Color>) -> Result<Self, SimulationError> {
        if dimension == 0
            || dimension > MAX_DIMENSION
            || dimension.checked_mul(dimension).is_none()
        {
            return Err(SimulationError::InvalidDimension(dimension));
        }
        if palette.is_empty() {
            return Err(SimulationError::EmptyPalette);
        }
        Ok(Self {
            grid: Grid::new(dimension),
            palette,
            placed: 0,
            frames: 0,
            elapsed: Duration::ZERO,
            last_frame: FrameStats::default(),
            rng: StdRng::from_entropy(),
            clock: Box::new(MonotonicClock::new()),
        })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.grid.dimension()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn placed(&self) -> usize {
        self.placed
    }

    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }

    /// Mean frame time over every frame so far; `None` before the first frame.
    pub fn average_frame_time(&self) -> Option<Duration> {
        let frames = u32::try_from(self.frames).ok().filter(|&n| n > 0)?;
        Some(self.elapsed / frames)
    }

    /// Next colour in the cycle. Advances the cycle.
    fn next_color(&mut self) -> Color {
        let color = self.palette[self.placed % self.palette.len()];
        self.placed += 1;
        color
    }

    /// Run one frame: clear `surface`, then render and fall every grain in scan order,
    /// then report the running average frame time to `sink`.
    pub fn step(&mut self, surface: &mut dyn Surface, sink: &mut dyn MetricSink) -> FrameStats {
        self.frames += 1;
        let start = self.clock.now();

        surface.clear();
        let stats = self.scan(surface);

        let end = self.clock.now();
        self.elapsed += end.saturating_sub(start);
        self.last_frame = stats;
        sink.report(self.elapsed.as_secs_f64() / self.frames as f64);
        stats
    }

    /// Columns last to first, and within each column rows last to first.
    /// Moves are visible to cells scanned later in the same pass.
    fn scan(&mut self, surface: &mut dyn Surface) -> FrameStats {
        let dimension = self.grid.dimension();
        let mut stats = FrameStats::default();
        for column in (0..dimension).rev() {
            for row in (0..dimension).rev() {
                let Some(grain) = self.grid.get(column, row) else {
                    continue;
                };
                grain.render(surface, dimension, column, row);
                let fall = Grain::attempt_fall(&mut self.grid, column, row, &mut self.rng);
                if fall.moved() {
                    stats.moved += 1;
                }
            }
        }
        stats
    }

    /// Redraw every grain in place without applying the fall rule.
    pub fn render(&self, surface: &mut dyn Surface) {
        surface.clear();
        let dimension = self.grid.dimension();
        for column in (0..dimension).rev() {
            for row in (0..dimension).rev() {
                if let Some(grain) = self.grid.get(column, row) {
                    grain.render(surface, dimension, column, row);
                }
            }
        }
    }

    /// Grid cell under surface pixel `(x, y)`, or `None` if it lies outside the grid.
    pub fn cell_at(&self, surface_size: (u32, u32), x: f64, y: f64) -> Option<(usize, usize)> {
        let dimension = self.grid.dimension() as f64;
        let (width, height) = surface_size;
        if width == 0 || height == 0 || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let column = (x / (f64::from(width) / dimension)).floor();
        let row = (y / (f64::from(height) / dimension)).floor();
        let in_range = |v: f64| (0.0..dimension).contains(&v);
        (in_range(column) && in_range(row)).then(|| (column as usize, row as usize))
    }

    /// Drop a new grain at surface pixel `(x, y)` if that cell is empty.
    /// Returns the cell filled. Occupied or off-grid targets leave everything unchanged.
    pub fn add_grain(
        &mut self,
        surface_size: (u32, u32),
        x: f64,
        y: f64,
    ) -> Option<(usize, usize)> {
        let (column, row) = self.cell_at(surface_size, x, y)?;
        if !self.grid.is_empty(column, row) {
            return None;
        }
        let grain = Grain::new(self.next_color());
        self.grid.place(column, row, grain);
        trace!(column, row, placed = self.placed, "grain placed");
        Some((column, row))
    }

    /// Empty the grid. The colour cycle and frame timing carry on.
    pub fn clear_grid(&mut self) {
        self.grid.clear();
    }
}
