//! Frame scheduling: display-rate pacing and an explicit stop signal for the frame loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared stop flag, checked before every frame is scheduled.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Fixed-rate frame deadlines. A late frame moves the next deadline forward
/// instead of queueing catch-up frames.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    next_frame: Instant,
}

impl FramePacer {
    /// `rate` in frames per second; non-positive or non-finite rates fall back to 60.
    pub fn new(rate: f64, now: Instant) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 60.0 };
        Self {
            interval: Duration::from_secs_f64(1.0 / rate),
            next_frame: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left to wait (e.g. polling input) before the next frame is due.
    pub fn time_until_frame(&self, now: Instant) -> Duration {
        self.next_frame.saturating_duration_since(now)
    }

    /// True when a frame is due; schedules the one after it.
    pub fn frame_due(&mut self, now: Instant) -> bool {
        if now < self.next_frame {
            return false;
        }
        self.next_frame += self.interval;
        if self.next_frame <= now {
            self.next_frame = now + self.interval;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{MetricSink, PerfReadout, Simulation};
    use crate::surface::{PixelCanvas, Surface};
    use crate::theme::Theme;
    use ratatui::style::Color;

    fn sim(dimension: usize) -> Simulation {
        Simulation::new(dimension, Theme::default().sand).unwrap()
    }

    /// Drive up to `limit` frames back to back, stopping early once `stop` is cancelled.
    /// `between_frames` runs after each frame, where input would normally arrive.
    /// Returns the number of frames run.
    fn run_frames<F>(
        simulation: &mut Simulation,
        surface: &mut dyn Surface,
        sink: &mut dyn MetricSink,
        stop: &StopToken,
        limit: u64,
        mut between_frames: F,
    ) -> u64
    where
        F: FnMut(&mut Simulation, &mut dyn Surface),
    {
        let mut frames = 0;
        while frames < limit && !stop.is_cancelled() {
            simulation.step(surface, sink);
            frames += 1;
            between_frames(simulation, surface);
        }
        frames
    }

    #[test]
    fn test_stop_token_is_shared() {
        let token = StopToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_pacer_waits_for_deadline() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(50.0, start);
        assert_eq!(pacer.interval(), Duration::from_millis(20));
        assert!(pacer.frame_due(start));
        assert!(!pacer.frame_due(start + Duration::from_millis(10)));
        assert_eq!(
            pacer.time_until_frame(start + Duration::from_millis(5)),
            Duration::from_millis(15)
        );
        assert!(pacer.frame_due(start + Duration::from_millis(20)));
    }

    #[test]
    fn test_pacer_skips_missed_frames() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(50.0, start);
        assert!(pacer.frame_due(start));
        let late = start + Duration::from_millis(500);
        assert!(pacer.frame_due(late));
        assert!(!pacer.frame_due(late + Duration::from_millis(1)));
        assert_eq!(pacer.time_until_frame(late), Duration::from_millis(20));
    }

    #[test]
    fn test_pacer_rejects_bad_rate() {
        let pacer = FramePacer::new(0.0, Instant::now());
        assert_eq!(pacer.interval(), Duration::from_secs_f64(1.0 / 60.0));
        let pacer = FramePacer::new(f64::NAN, Instant::now());
        assert_eq!(pacer.interval(), Duration::from_secs_f64(1.0 / 60.0));
    }

    #[test]
    fn test_run_frames_runs_limit() {
        let mut sim = sim(4);
        let mut canvas = PixelCanvas::new(8, 4, Color::Black);
        let mut readout = PerfReadout::default();
        let ran = run_frames(&mut sim, &mut canvas, &mut readout, &StopToken::new(), 5, |_, _| {});
        assert_eq!(ran, 5);
        assert_eq!(sim.frames(), 5);
        assert!(readout.text().ends_with(" s"));
    }

    #[test]
    fn test_run_frames_stops_when_cancelled() {
        let mut sim = sim(4);
        let mut canvas = PixelCanvas::new(8, 4, Color::Black);
        let mut readout = PerfReadout::default();
        let stop = StopToken::new();
        let ran = run_frames(&mut sim, &mut canvas, &mut readout, &stop, 100, |sim, _| {
            if sim.frames() == 3 {
                stop.cancel();
            }
        });
        assert_eq!(ran, 3);
    }

    #[test]
    fn test_input_between_frames_lands_on_next_frame() {
        let mut sim = sim(4);
        let mut canvas = PixelCanvas::new(8, 4, Color::Black);
        let mut readout = PerfReadout::default();
        // 8 x 8 pixel surface, 2 px per cell. Drop one grain at (0, 0) after the first frame.
        run_frames(&mut sim, &mut canvas, &mut readout, &StopToken::new(), 6, |sim, surface| {
            if sim.frames() == 1 {
                assert_eq!(sim.add_grain(surface.size(), 0.5, 0.5), Some((0, 0)));
            }
        });
        assert_eq!(sim.grid().occupied(), 1);
        assert!(!sim.grid().is_empty(0, 3));
        // Last frame drew the settled grain on the floor cell.
        assert!(canvas.pixel(0, 6).is_some());
        assert!(canvas.pixel(0, 0).is_none());
    }
}
