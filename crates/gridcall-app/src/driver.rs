//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use gridcall_session::{SessionAction, SessionEvent};

use crate::{App, AppEvent};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in production and simulation.
///
/// # Implementations
///
/// - **Web**: wraps the real media SDK, the token and dial-out HTTP
///   endpoints, and DOM rendering
/// - **Simulation**: queues scripted events and records executed commands
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Poll for the next view input event.
    ///
    /// Returns an available event or `None` if no events are ready.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Poll for the next SDK event.
    ///
    /// Returns an event or `None` if none are pending.
    fn next_session_event(&mut self) -> impl Future<Output = Option<SessionEvent>> + Send;

    /// Execute a session command against the SDK or an HTTP endpoint.
    ///
    /// Results that matter to the session (connect failure, refreshed
    /// credentials) are reported back as [`SessionEvent`]s, not return
    /// values.
    ///
    /// # Errors
    ///
    /// Returns an error only for driver-level failures; command-level
    /// failures surface as events.
    fn execute(&mut self, command: SessionAction)
    -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Stop the connection and clean up resources.
    fn stop(&mut self);
}
