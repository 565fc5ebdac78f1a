/// Mock Platform for unit tests (manual time source)

use std::sync::Mutex;
use std::time::Duration;
use crate::platform::Platform;

/// Time only moves when a test advances it or when `sleep` is called
#[derive(Default)]
pub struct MockPlatform {
    now: Mutex<f64>,
    sleeps: Mutex<Vec<Duration>>,
}

impl MockPlatform {
    pub fn new(start: f64) -> Self {
        Self {
            now: Mutex::new(start),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, seconds: f64) {
        *self.now.lock().unwrap() += seconds;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Platform for MockPlatform {
    fn absolute_time(&self) -> f64 {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration.as_secs_f64());
    }
}
