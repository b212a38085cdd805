//! App: terminal init, frame loop, input handling.

use crate::SimConfig;
use crate::input::{Action, Pointer, key_to_action};
use crate::schedule::{FramePacer, StopToken};
use crate::simulation::{PerfReadout, Simulation};
use crate::surface::{PixelCanvas, Surface};
use crate::theme::Theme;
use crate::ui;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::layout::Rect;
use ratatui::{DefaultTerminal, Frame};
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::{debug, error, info};

pub struct App {
    config: SimConfig,
    theme: Theme,
    simulation: Simulation,
    /// Drawing surface; follows the terminal size, the grid does not.
    canvas: PixelCanvas,
    /// Where the canvas was last drawn, for mapping mouse cells to pixels.
    canvas_area: Rect,
    readout: PerfReadout,
    pointer: Pointer,
    paused: bool,
    /// Clear requested; the grid empties once the fade finishes.
    clearing: bool,
    clear_effect: Option<Effect>,
    clear_process_time: Option<Instant>,
    stop: StopToken,
}

impl App {
    pub fn new(config: SimConfig, theme: Theme) -> Result<Self> {
        let simulation = Simulation::new(config.dimension, theme.sand.clone())
            .context("invalid simulation settings")?;
        let canvas = PixelCanvas::new(0, 0, theme.bg);
        Ok(Self {
            config,
            theme,
            simulation,
            canvas,
            canvas_area: Rect::default(),
            readout: PerfReadout::default(),
            pointer: Pointer::default(),
            paused: false,
            clearing: false,
            clear_effect: None,
            clear_process_time: None,
            stop: StopToken::new(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("failed to enter alternate screen")?;

        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))
            .context("failed to build terminal backend")?;
        terminal.hide_cursor().ok();

        let result = self.run_loop(&mut terminal);

        // Restore
        terminal.show_cursor().ok();
        if let Err(err) = execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen) {
            error!(?err, "failed to leave alternate screen");
        }
        if let Err(err) = disable_raw_mode() {
            error!(?err, "failed to disable raw mode");
        }
        info!(
            frames = self.simulation.frames(),
            placed = self.simulation.placed(),
            grains = self.simulation.grid().occupied(),
            average = ?self.simulation.average_frame_time(),
            "simulation stopped"
        );

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut pacer = FramePacer::new(self.config.frame_rate, Instant::now());
        debug!(interval = ?pacer.interval(), "frame loop started");
        loop {
            if self.stop.is_cancelled() {
                return Ok(());
            }

            let now = Instant::now();
            if pacer.frame_due(now) {
                terminal.draw(|f| self.draw_frame(f, now))?;
                self.finish_clear_if_done();
            }

            // Input arrives between frames only.
            let timeout = pacer.time_until_frame(Instant::now());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let event = event::read()?;
                    self.handle_event(event);
                }
            }
        }
    }

    fn draw_frame(&mut self, frame: &mut Frame, now: Instant) {
        let (canvas_area, status_area) = ui::layout(frame.area());
        if self.canvas.resize(canvas_area.width, canvas_area.height) {
            let (width, height) = self.canvas.size();
            debug!(width, height, "surface resized");
        }
        self.canvas_area = canvas_area;

        if self.paused {
            self.simulation.render(&mut self.canvas);
        } else {
            self.simulation.step(&mut self.canvas, &mut self.readout);
        }

        let status = ui::Status {
            perf: self.readout.text(),
            grains: self.simulation.grid().occupied(),
            moving: self.simulation.last_frame().moved,
            frames: self.simulation.frames(),
            dimension: self.simulation.dimension(),
            paused: self.paused,
        };
        ui::draw(
            frame,
            &self.theme,
            &self.canvas,
            canvas_area,
            status_area,
            status,
            self.clearing,
            &mut self.clear_effect,
            &mut self.clear_process_time,
            now,
        );
    }

    fn finish_clear_if_done(&mut self) {
        if self.clearing && self.clear_effect.as_ref().is_some_and(|e| e.done()) {
            self.simulation.clear_grid();
            self.clearing = false;
            self.clear_effect = None;
            self.clear_process_time = None;
            info!("grid cleared");
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.apply_action(key_to_action(key));
            }
            Event::Mouse(mouse) => {
                let was_active = self.pointer.active;
                if let Some((x, y)) = self.pointer.handle(mouse, self.canvas_area) {
                    self.simulation.add_grain(self.canvas.size(), x, y);
                }
                if self.pointer.active != was_active {
                    debug!(active = self.pointer.active, "pointer toggled");
                }
            }
            Event::Resize(cols, rows) => debug!(cols, rows, "terminal resized"),
            _ => {}
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                info!("quit requested");
                self.stop.cancel();
            }
            Action::Pause => {
                self.paused = !self.paused;
                info!(paused = self.paused, "pause toggled");
            }
            Action::Clear => {
                if !self.clearing {
                    self.clearing = true;
                    self.clear_effect = None;
                    self.clear_process_time = None;
                    info!(grains = self.simulation.grid().occupied(), "clearing grid");
                }
            }
            Action::None => {}
        }
    }
}
