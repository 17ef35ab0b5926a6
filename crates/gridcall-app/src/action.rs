//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.
//! Session operations go through the [`crate::Bridge`]; `Render` and `Quit`
//! are handled by the driver directly.

use gridcall_session::{ParticipantId, StreamKey, StreamTracks, SubscriptionQuality};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Connect to a room.
    Connect {
        /// Room identifier.
        room_id: String,
        /// Client credential.
        token: String,
    },

    /// Leave the current room.
    Leave,

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

    /// Send a broadcast chat message.
    SendChat {
        /// Message body.
        payload: String,
    },

    /// Select a subscription quality for a remote stream.
    SetQuality {
        /// Stream owner.
        participant: ParticipantId,
        /// Publication key.
        key: StreamKey,
        /// Requested tier.
        quality: SubscriptionQuality,
    },

    /// Clear the unread chat counter.
    MarkChatRead,

    /// Dial a phone number into the room.
    Invite {
        /// Number to dial.
        target: String,
    },
}
