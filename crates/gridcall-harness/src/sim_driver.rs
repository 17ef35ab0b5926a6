//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface a production frontend would but
//! for deterministic testing. It implements [`Driver`] so the same
//! [`gridcall_app::Runtime`] orchestration code runs in both production and
//! simulation.

#![allow(
    clippy::unwrap_used,
    reason = "Poisoned locks are unrecoverable in a simulation harness"
)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use gridcall_app::{App, AppEvent, Driver};
use gridcall_core::Environment;
use gridcall_session::{SessionAction, SessionEvent};

use crate::{SimEnv, SimInstant};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Shared state for event injection.
///
/// This allows injection from outside async contexts.
#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    pending_session_events: VecDeque<SessionEvent>,
    executed: Vec<SessionAction>,
    render_count: usize,
    auto_token: bool,
    token_serial: u64,
}

/// Simulation driver for deterministic testing.
///
/// Queues injected view and SDK events, records every executed command for
/// assertions, and optionally answers `RequestToken` commands with a
/// synthetic refreshed credential.
#[derive(Clone)]
pub struct SimDriver {
    env: SimEnv,
    state: Arc<Mutex<SharedState>>,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new(SimEnv::new())
    }
}

impl SimDriver {
    /// Create a new simulation driver over the given environment.
    #[must_use]
    pub fn new(env: SimEnv) -> Self {
        Self { env, state: Arc::new(Mutex::new(SharedState::default())) }
    }

    /// Answer every `RequestToken` command with a synthetic credential.
    #[must_use]
    pub fn with_auto_token(self) -> Self {
        self.state.lock().unwrap().auto_token = true;
        self
    }

    /// The driver's environment handle.
    #[must_use]
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Inject a view event for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.state.lock().unwrap().pending_events.push_back(event);
    }

    /// Inject an SDK event.
    pub fn inject_session_event(&self, event: SessionEvent) {
        self.state.lock().unwrap().pending_session_events.push_back(event);
    }

    /// Take all commands executed so far.
    pub fn take_executed(&self) -> Vec<SessionAction> {
        std::mem::take(&mut self.state.lock().unwrap().executed)
    }

    /// Number of render calls so far.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.state.lock().unwrap().render_count
    }

    /// Check if there are pending events to process.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        let state = self.state.lock().unwrap();
        !state.pending_events.is_empty() || !state.pending_session_events.is_empty()
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.state.lock().unwrap().pending_events.pop_front())
    }

    async fn next_session_event(&mut self) -> Option<SessionEvent> {
        self.state.lock().unwrap().pending_session_events.pop_front()
    }

    async fn execute(&mut self, command: SessionAction) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();

        if state.auto_token && matches!(command, SessionAction::RequestToken) {
            state.token_serial += 1;
            let token = format!("sim-token-{}", state.token_serial);
            state.pending_session_events.push_back(SessionEvent::TokenRefreshed { token });
        }

        state.executed.push(command);
        Ok(())
    }

    fn now(&self) -> SimInstant {
        self.env.now()
    }

    fn render(&mut self, _app: &App) -> Result<(), Self::Error> {
        self.state.lock().unwrap().render_count += 1;
        Ok(())
    }

    fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use gridcall_app::UserCommand;

    use super::*;

    #[test]
    fn inject_event_queues_event() {
        let driver = SimDriver::default();
        driver.inject_event(AppEvent::Command(UserCommand::OpenChat));

        assert!(driver.has_pending());
    }

    #[tokio::test]
    async fn execute_records_commands() {
        let mut driver = SimDriver::default();
        driver
            .execute(SessionAction::Connect { room_id: "r".into(), token: "t".into() })
            .await
            .unwrap();

        let executed = driver.take_executed();
        assert!(matches!(executed.as_slice(), [SessionAction::Connect { .. }]));
    }

    #[tokio::test]
    async fn auto_token_answers_refresh_requests() {
        let mut driver = SimDriver::default().with_auto_token();
        driver.execute(SessionAction::RequestToken).await.unwrap();

        let echoed = driver.next_session_event().await;
        assert!(matches!(
            echoed,
            Some(SessionEvent::TokenRefreshed { token }) if token == "sim-token-1"
        ));
    }
}
