//! Credential refresh scheduling.
//!
//! While the session is connected, a fresh credential is requested every
//! `ttl - lead` seconds and pushed into the live connection without
//! interrupting it. A failed refresh takes no corrective action; the next
//! natural interval retries. The schedule stops the moment the session
//! leaves the connected state.
//!
//! Tick-driven like a heartbeat: time is passed in, never read from a clock.

use std::{ops::Sub, time::Duration};

use crate::event::SessionAction;

/// Credential refresh schedule for one connection.
///
/// Generic over `Instant` to support both real time and virtual time for
/// deterministic testing.
#[derive(Debug, Clone, Copy)]
pub struct TokenRefresh<I> {
    interval: Duration,
    running: bool,
    last_request: Option<I>,
}

impl<I> TokenRefresh<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create a stopped schedule with the given refresh interval.
    pub fn new(interval: Duration) -> Self {
        Self { interval, running: false, last_request: None }
    }

    /// Interval between refresh requests.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the schedule is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start the schedule. The first request fires one interval after the
    /// first tick; the credential used to connect is still fresh.
    pub fn start(&mut self) {
        self.running = true;
        self.last_request = None;
    }

    /// Stop the schedule and forget any pending interval.
    pub fn stop(&mut self) {
        self.running = false;
        self.last_request = None;
    }

    /// Emit a refresh request if the interval has elapsed.
    pub fn tick(&mut self, now: I) -> Option<SessionAction> {
        if !self.running {
            return None;
        }

        match self.last_request {
            None => {
                self.last_request = Some(now);
                None
            },
            Some(last) if now - last >= self.interval => {
                self.last_request = Some(now);
                tracing::debug!("requesting credential refresh");
                Some(SessionAction::RequestToken)
            },
            Some(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    const INTERVAL: Duration = Duration::from_secs(30);

    #[test]
    fn stopped_schedule_emits_nothing() {
        let mut refresh: TokenRefresh<Instant> = TokenRefresh::new(INTERVAL);
        assert!(refresh.tick(Instant::now()).is_none());
    }

    #[test]
    fn fires_once_per_interval() {
        let start = Instant::now();
        let mut refresh = TokenRefresh::new(INTERVAL);
        refresh.start();

        // First tick anchors the schedule
        assert!(refresh.tick(start).is_none());
        assert!(refresh.tick(start + Duration::from_secs(29)).is_none());
        assert!(matches!(
            refresh.tick(start + Duration::from_secs(30)),
            Some(SessionAction::RequestToken)
        ));
        // Next request a full interval later
        assert!(refresh.tick(start + Duration::from_secs(31)).is_none());
        assert!(matches!(
            refresh.tick(start + Duration::from_secs(60)),
            Some(SessionAction::RequestToken)
        ));
    }

    #[test]
    fn stop_halts_the_schedule() {
        let start = Instant::now();
        let mut refresh = TokenRefresh::new(INTERVAL);
        refresh.start();
        let _ = refresh.tick(start);

        refresh.stop();
        assert!(refresh.tick(start + Duration::from_secs(120)).is_none());
    }
}
