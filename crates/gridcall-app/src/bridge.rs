//! Session-to-application translation layer.
//!
//! The [`Bridge`] wraps the [`gridcall_session::RoomSession`] state machine
//! and adapts it to the view-level lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level [`crate::AppAction`]s into session operations.
//! - Accumulates outgoing [`SessionAction`] commands to be executed by the
//!   driver in the next I/O cycle.
//! - Interprets session results and converts them back into
//!   [`crate::AppEvent`]s to update the view, including republishing the
//!   snapshot whenever it changed.
//! - Manages time ticks generically to support both real-time execution and
//!   deterministic simulation.

use std::{
    ops::Sub,
    sync::Arc,
    time::{Duration, Instant},
};

use gridcall_core::{DisconnectReason, SessionConfig};
use gridcall_session::{RoomSession, SessionAction, SessionEvent, SessionSnapshot};

use crate::{AppAction, AppEvent};

/// Bridge between App and the room session state machine.
///
/// Generic over the instant type to support both production and simulation.
pub struct Bridge<I = Instant>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    session: RoomSession<I>,
    outgoing: Vec<SessionAction>,
    last_snapshot: Arc<SessionSnapshot>,
}

impl<I> Bridge<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create a new Bridge with the given session configuration.
    pub fn new(config: SessionConfig) -> Self {
        let session = RoomSession::new(config);
        let last_snapshot = session.snapshot();
        Self { session, outgoing: Vec::new(), last_snapshot }
    }

    /// The wrapped session state machine.
    pub fn session(&self) -> &RoomSession<I> {
        &self.session
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction, now: I) -> Vec<AppEvent> {
        let actions = match action {
            AppAction::Connect { room_id, token } => self.session.connect(room_id, token),
            AppAction::Leave => self.session.disconnect(DisconnectReason::UserInitiated),
            AppAction::PublishStream { key, tracks } => self.session.add_stream(key, tracks),
            AppAction::ReplaceStream { key, tracks } => self.session.update_stream(key, tracks),
            AppAction::RetractStream { key } => self.session.remove_stream(key),
            AppAction::SendChat { payload } => self.session.send_message(payload, None),
            AppAction::SetQuality { participant, key, quality } => {
                self.session.set_subscription_quality(&participant, &key, quality)
            },
            AppAction::MarkChatRead => {
                self.session.mark_chat_read();
                vec![]
            },
            AppAction::Invite { target } => self.session.invite(target, now),
            AppAction::Render | AppAction::Quit => vec![],
        };

        self.absorb(actions)
    }

    /// Handle an event from the SDK driver.
    pub fn handle_session_event(&mut self, event: SessionEvent, now: I) -> Vec<AppEvent> {
        let actions = self.session.handle(event, now);
        self.absorb(actions)
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: I) -> Vec<AppEvent> {
        let actions = self.session.tick(now);
        self.absorb(actions)
    }

    /// Take pending outgoing SDK commands.
    pub fn take_outgoing(&mut self) -> Vec<SessionAction> {
        std::mem::take(&mut self.outgoing)
    }

    /// Split session actions into view events and driver commands, and
    /// append a snapshot event when the session state changed.
    fn absorb(&mut self, actions: Vec<SessionAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                SessionAction::Notify(notification) => {
                    events.push(AppEvent::Notified(notification));
                },
                other => self.outgoing.push(other),
            }
        }

        let snapshot = self.session.snapshot();
        if !Arc::ptr_eq(&snapshot, &self.last_snapshot) {
            self.last_snapshot = Arc::clone(&snapshot);
            events.push(AppEvent::SnapshotUpdated(snapshot));
        }

        events
    }
}
