//! Application input events.
//!
//! This module defines [`AppEvent`], the comprehensive set of inputs that
//! drive the [`crate::App`] state machine.
//!
//! Events originate from three distinct sources:
//! - User interactions ([`UserCommand`]) and viewport geometry changes.
//! - Session happenings translated by the [`crate::Bridge`].
//! - Periodic ticks.

use std::sync::Arc;

use gridcall_core::SessionError;
use gridcall_session::{
    Notification, ParticipantId, SessionSnapshot, StreamKey, StreamTracks, SubscriptionQuality,
};

/// Intents issued by the user through the frontend.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Join a room with a credential.
    Connect {
        /// Room identifier.
        room_id: String,
        /// Client credential.
        token: String,
    },
    /// Leave the current room.
    Leave,
    /// Send a broadcast chat message.
    SendChat {
        /// Message body.
        payload: String,
    },
    /// Open the chat panel; clears the unread counter.
    OpenChat,
    /// Close the chat panel.
    CloseChat,
    /// Advance to the next tile page.
    NextPage,
    /// Go back one tile page.
    PreviousPage,
    /// Select a subscription quality for a remote stream.
    SetQuality {
        /// Stream owner.
        participant: ParticipantId,
        /// Publication key.
        key: StreamKey,
        /// Requested tier.
        quality: SubscriptionQuality,
    },
    /// Dial a phone number into the room.
    Invite {
        /// Number to dial.
        target: String,
    },
    /// Publish a local stream.
    PublishStream {
        /// Publication key.
        key: StreamKey,
        /// Tracks to publish.
        tracks: StreamTracks,
    },
    /// Replace the tracks of a published local stream.
    ReplaceStream {
        /// Publication key.
        key: StreamKey,
        /// Replacement tracks.
        tracks: StreamTracks,
    },
    /// Retract a published local stream.
    RetractStream {
        /// Publication key.
        key: StreamKey,
    },
    /// Dismiss the current error dialog.
    DismissError,
    /// Quit the application.
    Quit,
}

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Periodic tick.
    Tick,

    /// Viewport resize, in pixels.
    Resize {
        /// New viewport width.
        width: f64,
        /// New viewport height.
        height: f64,
    },

    /// A representative tile's rendered size was measured.
    TileMeasured {
        /// Measured tile width.
        width: f64,
        /// Measured tile height.
        height: f64,
    },

    /// A user intent from the frontend.
    Command(UserCommand),

    /// The session published a new state snapshot.
    SnapshotUpdated(Arc<SessionSnapshot>),

    /// The session surfaced a user-visible notice.
    Notified(Notification),

    /// A media device could not be acquired by the driver.
    ///
    /// Localized to the requesting control: the session and other tracks
    /// are unaffected.
    DeviceFailed(SessionError),

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
