//! Monotonic time source used for frame timing.

use std::time::{Duration, Instant};

/// Monotonic timestamp source. Only differences between readings are meaningful.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock-independent time since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
