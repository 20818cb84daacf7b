//! Time helpers and milli-unit conversions used across the PDU core.

use embassy_time::{Duration, Instant};

/// Time/Duration extensions
pub trait TimeExt {
    fn ms(self) -> Duration;
    fn s(self) -> Duration;
}

impl TimeExt for u64 {
    fn ms(self) -> Duration {
        Duration::from_millis(self)
    }

    fn s(self) -> Duration {
        Duration::from_secs(self)
    }
}

impl TimeExt for u32 {
    fn ms(self) -> Duration {
        Duration::from_millis(self as u64)
    }

    fn s(self) -> Duration {
        Duration::from_secs(self as u64)
    }
}

/// Const-friendly time constants
pub mod time {
    use embassy_time::Duration;

    pub const fn ms(val: u64) -> Duration {
        Duration::from_millis(val)
    }
    pub const fn s(val: u64) -> Duration {
        Duration::from_secs(val)
    }
}

/// Converts a milli-unit reading (mA, mV, mW) into its base unit.
#[inline]
pub fn from_milli(value: f32) -> f32 {
    value / 1000.0
}

/// Elapsed-time check against a monotonic clock that is polled, never awaited.
///
/// A zero interval disables the timer.
#[derive(Debug, Clone, Copy)]
pub struct PollTimer {
    interval: Duration,
    last: Instant,
}

impl PollTimer {
    pub const fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last: start,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn is_disabled(&self) -> bool {
        self.interval == Duration::from_ticks(0)
    }

    /// True once strictly more than `interval` has passed since the last reset.
    pub fn is_due(&self, now: Instant) -> bool {
        if self.is_disabled() {
            return false;
        }
        now.checked_duration_since(self.last)
            .is_some_and(|elapsed| elapsed > self.interval)
    }

    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }

    /// Resets and returns true when the timer is due.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.reset(now);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_ext() {
        assert_eq!(40u32.ms(), Duration::from_millis(40));
        assert_eq!(60u64.s(), Duration::from_secs(60));
        assert_eq!(time::ms(40), 40u64.ms());
    }

    #[test]
    fn test_from_milli() {
        assert!((from_milli(2500.0) - 2.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_poll_timer_fires_strictly_after_interval() {
        let mut timer = PollTimer::new(40u32.ms(), Instant::from_millis(0));
        assert!(!timer.fire(Instant::from_millis(40)));
        assert!(timer.fire(Instant::from_millis(41)));
        // Reset to the firing instant
        assert!(!timer.fire(Instant::from_millis(60)));
        assert!(timer.fire(Instant::from_millis(82)));
    }

    #[test]
    fn test_poll_timer_zero_interval_never_fires() {
        let mut timer = PollTimer::new(Duration::from_ticks(0), Instant::from_millis(0));
        assert!(timer.is_disabled());
        assert!(!timer.fire(Instant::from_secs(1_000_000)));
    }

    #[test]
    fn test_poll_timer_ignores_clock_behind_start() {
        let timer = PollTimer::new(10u32.ms(), Instant::from_millis(100));
        assert!(!timer.is_due(Instant::from_millis(5)));
    }
}
