//! Cancellable debounce timer.
//!
//! A single-deadline timer where arming always replaces any pending deadline.
//! This is the primitive behind dominant-speaker expiry (every activity event
//! re-arms the full window) and the invite join-acknowledgement timeout.
//!
//! The timer is pure: time is passed as a parameter, never read from a clock,
//! so it behaves identically under real and virtual time.

use std::{ops::Sub, time::Duration};

/// Cancellable single-deadline timer.
///
/// Arming while a deadline is pending discards the old deadline entirely; the
/// full window restarts from the new arm time. [`DebounceTimer::fire_if_due`]
/// reports expiry at most once per armed deadline.
///
/// Generic over `Instant` to support both real time and virtual time for
/// deterministic testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTimer<I> {
    window: Duration,
    armed_at: Option<I>,
}

impl<I> DebounceTimer<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create an unarmed timer with the given window.
    pub fn new(window: Duration) -> Self {
        Self { window, armed_at: None }
    }

    /// Arm the timer, superseding any pending deadline.
    pub fn arm(&mut self, now: I) {
        self.armed_at = Some(now);
    }

    /// Discard any pending deadline.
    pub fn cancel(&mut self) {
        self.armed_at = None;
    }

    /// Whether a deadline is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }

    /// The configured window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Fire the timer if the window has elapsed since the last arm.
    ///
    /// Returns `true` at most once per armed deadline; firing disarms.
    pub fn fire_if_due(&mut self, now: I) -> bool {
        let Some(armed_at) = self.armed_at else {
            return false;
        };

        if now - armed_at >= self.window {
            self.armed_at = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    const WINDOW: Duration = Duration::from_secs(5);

    #[test]
    fn unarmed_timer_never_fires() {
        let mut timer: DebounceTimer<Instant> = DebounceTimer::new(WINDOW);
        assert!(!timer.fire_if_due(Instant::now()));
    }

    #[test]
    fn fires_once_after_window() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new(WINDOW);
        timer.arm(start);

        assert!(!timer.fire_if_due(start + Duration::from_secs(4)));
        assert!(timer.fire_if_due(start + Duration::from_secs(5)));
        // Disarmed after firing
        assert!(!timer.fire_if_due(start + Duration::from_secs(60)));
    }

    #[test]
    fn rearm_resets_full_window() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new(WINDOW);
        timer.arm(start);

        // Re-arm at 4s: old deadline at 5s is superseded
        timer.arm(start + Duration::from_secs(4));
        assert!(!timer.fire_if_due(start + Duration::from_secs(5)));
        assert!(!timer.fire_if_due(start + Duration::from_secs(8)));
        // New deadline is 4s + 5s = 9s from the first arm
        assert!(timer.fire_if_due(start + Duration::from_secs(9)));
    }

    #[test]
    fn cancel_discards_deadline() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new(WINDOW);
        timer.arm(start);
        timer.cancel();

        assert!(!timer.is_armed());
        assert!(!timer.fire_if_due(start + Duration::from_secs(10)));
    }
}
