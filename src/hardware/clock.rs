//! Time sources for the control loop.
//!
//! Timestamps are monotonic durations since an arbitrary origin, read at
//! microsecond resolution. The loop only ever takes differences, so the
//! origin is irrelevant. Two implementations are provided:
//!
//! - [`SystemClock`]: wall time via [`Instant`], sleeping with
//!   `thread::sleep`. Used against real or simulated hardware.
//! - [`VirtualClock`]: a shared microsecond counter advanced explicitly by
//!   `sleep` and by scripted sensor polls, so tests run instantaneously and
//!   deterministically regardless of the real timings involved.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonic time source with a blocking sleep.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;

    /// Blocks for at least `duration`.
    fn sleep(&self, duration: Duration);
}

/// Real time: `Instant`-based timestamps and thread sleeps.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose origin is the moment of construction.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Simulated time: a shared microsecond counter.
///
/// Cloning yields a handle onto the same counter, so a test, a scripted rig,
/// and the controller can all observe one timeline. `sleep` advances the
/// counter instead of blocking.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    micros: Arc<Mutex<u64>>,
}

impl VirtualClock {
    /// Creates a clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the timeline.
    pub fn advance(&self, duration: Duration) {
        let mut micros = self.micros.lock();
        *micros = micros.saturating_add(duration.as_micros() as u64);
    }

    /// Current simulated time in microseconds.
    pub fn now_micros(&self) -> u64 {
        *self.micros.lock()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.now_micros())
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_starts_at_zero() {
        let clock = VirtualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn test_virtual_sleep_advances_time() {
        let clock = VirtualClock::new();
        clock.sleep(Duration::from_millis(100));
        clock.sleep(Duration::from_micros(7));
        assert_eq!(clock.now(), Duration::from_micros(100_007));
    }

    #[test]
    fn test_virtual_clock_handles_share_a_timeline() {
        let clock = VirtualClock::new();
        let handle = clock.clone();
        handle.advance(Duration::from_secs(1));
        assert_eq!(clock.now_micros(), 1_000_000);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
