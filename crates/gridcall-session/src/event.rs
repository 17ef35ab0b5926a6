//! Session events and actions.
//!
//! [`SessionEvent`] is the typed form of the external SDK's event stream: the
//! driver receives SDK callbacks, translates them into this tagged union, and
//! feeds them to the session in arrival order. [`SessionAction`] is the
//! reverse path: commands the session wants executed against the SDK, the
//! token endpoint, or the notification surface.

use std::collections::HashMap;

use gridcall_core::DisconnectReason;

use crate::model::{
    Participant, ParticipantId, QualitySample, Stream, StreamKey, SubscriptionQuality, TrackHandle,
    TrackKind,
};

/// Local tracks attached to a publish command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamTracks {
    /// Audio track to publish.
    pub audio: Option<TrackHandle>,
    /// Video track to publish.
    pub video: Option<TrackHandle>,
}

/// Events the driver feeds into the session.
///
/// The driver is responsible for:
/// - Translating SDK callbacks into these variants, in arrival order
/// - Driving time forward via [`crate::RoomSession::tick`]
///
/// Handlers are invoked in a single-threaded, non-overlapping sequence;
/// ordering across event kinds is exactly dispatch order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The session is established.
    Connected {
        /// The local participant.
        local: Participant,
        /// Everyone already in the room, excluding the local participant.
        participants: Vec<Participant>,
        /// Streams already published in the room.
        streams: Vec<Stream>,
        /// Server-mixed room audio, when provided.
        mixed_audio: Option<TrackHandle>,
    },

    /// The session ended or a connect attempt failed.
    Disconnected {
        /// Why the session ended.
        reason: DisconnectReason,
    },

    /// A participant joined the room.
    ParticipantJoined {
        /// The new participant.
        participant: Participant,
    },

    /// A participant is about to leave.
    ParticipantLeaving {
        /// Who is leaving.
        id: ParticipantId,
        /// A moderator removed them.
        kicked: bool,
    },

    /// A participant left the room.
    ParticipantLeft {
        /// Who left.
        id: ParticipantId,
    },

    /// A stream was published.
    StreamPublished {
        /// The new stream.
        stream: Stream,
    },

    /// A stream was retracted.
    StreamUnpublished {
        /// Owning participant.
        owner: ParticipantId,
        /// Publication key.
        key: StreamKey,
    },

    /// A track was enabled.
    TrackEnabled {
        /// Owning participant.
        owner: ParticipantId,
        /// Publication key.
        key: StreamKey,
        /// Which track kind.
        kind: TrackKind,
    },

    /// A track was disabled.
    TrackDisabled {
        /// Owning participant.
        owner: ParticipantId,
        /// Publication key.
        key: StreamKey,
        /// Which track kind.
        kind: TrackKind,
    },

    /// A moderator muted a participant's track.
    TrackCensored {
        /// Affected participant.
        owner: ParticipantId,
        /// Which track kind.
        kind: TrackKind,
    },

    /// A moderator unmuted a participant's track.
    TrackUncensored {
        /// Affected participant.
        owner: ParticipantId,
        /// Which track kind.
        kind: TrackKind,
    },

    /// Voice activity was detected on a stream.
    AudioActivity {
        /// Speaking participant.
        id: ParticipantId,
        /// Stream key the activity was detected on, when the SDK reports it.
        key: Option<StreamKey>,
    },

    /// A chat message arrived (including the echo of our own sends).
    MessageReceived {
        /// Sender identity.
        sender: ParticipantId,
        /// Message body.
        payload: String,
        /// Explicit recipients; `None` means broadcast.
        recipients: Option<Vec<ParticipantId>>,
    },

    /// A fresh network-metrics report; replaces the previous one wholesale.
    NetworkMetrics {
        /// Quality sample per participant.
        reports: HashMap<ParticipantId, QualitySample>,
    },

    /// The token endpoint returned a fresh credential.
    TokenRefreshed {
        /// The new short-lived token.
        token: String,
    },

    /// The token endpoint call failed; retried on the next interval.
    TokenRefreshFailed {
        /// Failure description, logged only.
        detail: String,
    },
}

/// Commands the session produces for the driver to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Initialize the SDK and connect to a room.
    Connect {
        /// Room identifier.
        room_id: String,
        /// Client credential.
        token: String,
    },

    /// Tear down the connection (best-effort remote notification).
    Disconnect {
        /// Why the session is ending.
        reason: DisconnectReason,
    },

    /// Publish a local stream under a key.
    AddStream {
        /// Publication key.
        key: StreamKey,
        /// Tracks to publish.
        tracks: StreamTracks,
    },

    /// Replace the tracks of a published local stream.
    UpdateStream {
        /// Publication key.
        key: StreamKey,
        /// Replacement tracks.
        tracks: StreamTracks,
    },

    /// Retract a published local stream.
    RemoveStream {
        /// Publication key.
        key: StreamKey,
    },

    /// Subscribe to a remote stream.
    AddSubscription {
        /// Stream owner.
        participant: ParticipantId,
        /// Publication key.
        key: StreamKey,
        /// Receive audio.
        audio: bool,
        /// Receive video.
        video: bool,
    },

    /// Change the quality of an existing subscription.
    UpdateSubscription {
        /// Stream owner.
        participant: ParticipantId,
        /// Publication key.
        key: StreamKey,
        /// Requested quality tier.
        quality: SubscriptionQuality,
    },

    /// Send a chat message. The local log is only updated by the echo event.
    SendMessage {
        /// Message body.
        payload: String,
        /// Explicit recipients; `None` means broadcast.
        recipients: Option<Vec<ParticipantId>>,
    },

    /// Fetch a fresh credential from the token endpoint.
    RequestToken,

    /// Invite a phone number into the room via the dial-out endpoint.
    DialOut {
        /// Number or address to dial.
        target: String,
    },

    /// Push a refreshed credential into the live connection.
    UpdateToken {
        /// The new short-lived token.
        token: String,
    },

    /// Ask the SDK to report network metrics for these participants.
    EnableMetricsReports {
        /// Participants to report on.
        ids: Vec<ParticipantId>,
    },

    /// Surface a user-visible notice.
    Notify(Notification),
}

/// User-visible notices produced by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A participant joined the room.
    ParticipantJoined {
        /// Their display name.
        name: String,
    },
    /// A moderator removed a remote participant.
    ParticipantKicked {
        /// Their display name.
        name: String,
    },
    /// A moderator removed the local participant.
    KickedLocally,
    /// A moderator muted the local participant.
    CensoredLocally,
    /// A moderator unmuted the local participant.
    UncensoredLocally,
    /// A moderator muted a remote participant.
    Censored {
        /// Their display name.
        name: String,
    },
    /// A moderator unmuted a remote participant.
    Uncensored {
        /// Their display name.
        name: String,
    },
    /// The connection dropped unexpectedly.
    ConnectionLost {
        /// Why the session ended.
        reason: DisconnectReason,
    },
    /// An invited participant did not join in time.
    InviteTimedOut {
        /// Label of the invited target (display name or number).
        target: String,
    },
}

impl Notification {
    /// Short title for rendering.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::ParticipantJoined { .. } => "Participant joined",
            Self::ParticipantKicked { .. } => "Participant removed",
            Self::KickedLocally => "Removed from room",
            Self::CensoredLocally => "You were muted",
            Self::UncensoredLocally => "You were unmuted",
            Self::Censored { .. } => "Participant muted",
            Self::Uncensored { .. } => "Participant unmuted",
            Self::ConnectionLost { .. } => "Connection lost",
            Self::InviteTimedOut { .. } => "Invite timed out",
        }
    }

    /// One-line body for rendering.
    #[must_use]
    pub fn body(&self) -> String {
        match self {
            Self::ParticipantJoined { name } => format!("{name} joined the room."),
            Self::ParticipantKicked { name } => format!("{name} was removed by a moderator."),
            Self::KickedLocally => "A moderator removed you from the room.".to_string(),
            Self::CensoredLocally => "A moderator muted your microphone.".to_string(),
            Self::UncensoredLocally => "A moderator unmuted your microphone.".to_string(),
            Self::Censored { name } => format!("{name} was muted by a moderator."),
            Self::Uncensored { name } => format!("{name} was unmuted by a moderator."),
            Self::ConnectionLost { reason } => {
                format!("The room connection ended ({}).", reason.as_str())
            },
            Self::InviteTimedOut { target } => format!("{target} did not answer."),
        }
    }
}
