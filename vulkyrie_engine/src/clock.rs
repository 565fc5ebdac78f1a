/// Clock - elapsed time tracking on top of the platform time source

use std::sync::Arc;
use crate::platform::Platform;

/// Stopwatch driven by [`Platform::absolute_time`]
///
/// `update` must be called before reading `elapsed`. A stopped clock keeps
/// its last elapsed value.
pub struct Clock {
    platform: Arc<dyn Platform>,
    start_time: f64,
    elapsed: f64,
    running: bool,
}

impl Clock {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            start_time: 0.0,
            elapsed: 0.0,
            running: false,
        }
    }

    /// Start (or restart) the clock and reset elapsed time
    pub fn start(&mut self) {
        self.start_time = self.platform.absolute_time();
        self.elapsed = 0.0;
        self.running = true;
    }

    /// Refresh elapsed time. No effect on a stopped clock.
    pub fn update(&mut self) {
        if self.running {
            self.elapsed = self.platform.absolute_time() - self.start_time;
        }
    }

    /// Stop the clock without resetting elapsed time
    pub fn stop(&mut self) {
        self.running = false;
        self.start_time = 0.0;
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
