//! Elapsed-time sources for the animation loop.

use std::time::Instant;

/// Seconds since the loop started.
pub trait Clock {
    fn elapsed(&self) -> f32;
}

/// Wall-clock time from a monotonic [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::start()
    }
}

impl Clock for MonotonicClock {
    fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Hand-driven clock for deterministic frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    seconds: f32,
}

impl ManualClock {
    pub fn new(seconds: f32) -> Self {
        Self { seconds }
    }

    pub fn set(&mut self, seconds: f32) {
        self.seconds = seconds;
    }

    pub fn advance(&mut self, seconds: f32) {
        self.seconds += seconds;
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> f32 {
        self.seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::start();
        let first = clock.elapsed();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(clock.elapsed() >= first);
    }

    #[test]
    fn test_manual_clock() {
        let mut clock = ManualClock::default();
        assert_eq!(clock.elapsed(), 0.0);
        clock.advance(0.5);
        clock.advance(0.25);
        assert_eq!(clock.elapsed(), 0.75);
        clock.set(10.0);
        assert_eq!(clock.elapsed(), 10.0);
    }
}
