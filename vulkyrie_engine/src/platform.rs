/// Platform abstraction consumed by the engine core
///
/// The engine never reaches for a global platform. The application driver
/// owns one `Arc<dyn Platform>` and hands clones to whatever needs time or
/// sleeping.

use std::time::Duration;

pub trait Platform: Send + Sync {
    /// Monotonic time in seconds since an arbitrary, fixed origin
    fn absolute_time(&self) -> f64;

    /// Give the remaining frame budget back to the OS
    fn sleep(&self, duration: Duration);
}
