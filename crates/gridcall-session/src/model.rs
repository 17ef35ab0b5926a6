//! Observable session state types.
//!
//! These structures are the view model for the room: the subset of SDK state
//! the UI needs, without exposing transport or codec details. Participants
//! and streams are replaced wholesale when the SDK reports a change; nothing
//! here is mutated behind a shared reference.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Unique participant identity within a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Construct from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Where a participant's media originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantOrigin {
    /// The local user.
    Local,
    /// A remote peer.
    Remote,
    /// A dialed-in phone participant bridged by the telephony engine.
    TelephonyEngine,
}

/// One connected identity within the room.
///
/// The context blob is opaque JSON owned by the SDK; gridcall only reads the
/// display name and capability flags out of it. Participants are never
/// mutated in place; the session replaces them when the SDK emits a new
/// state.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    /// Unique identity.
    pub id: ParticipantId,
    /// Media origin.
    pub origin: ParticipantOrigin,
    /// Opaque context carrying at least a display name.
    pub context: serde_json::Value,
}

impl Participant {
    /// Construct a participant with the given context blob.
    pub fn new(
        id: impl Into<ParticipantId>,
        origin: ParticipantOrigin,
        context: serde_json::Value,
    ) -> Self {
        Self { id: id.into(), origin, context }
    }

    /// Display name from the context, falling back to the raw id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.context
            .get("displayName")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_else(|| self.id.as_str())
    }

    /// Whether this participant can receive chat messages.
    ///
    /// Absent flag means capable; only an explicit `false` opts out
    /// (telephony participants typically carry one).
    #[must_use]
    pub fn can_receive_messages(&self) -> bool {
        self.context
            .get("canReceiveMessages")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(true)
    }
}

impl From<ParticipantId> for Participant {
    fn from(id: ParticipantId) -> Self {
        Self { id, origin: ParticipantOrigin::Remote, context: serde_json::Value::Null }
    }
}

/// Name of a keyed media publication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamKey {
    /// The participant's own camera/microphone feed (wire key `self`).
    Main,
    /// A screen-share feed (wire key `presentation`).
    Presentation,
    /// Any other named publication.
    Named(String),
}

impl StreamKey {
    /// Wire label for this key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Main => "self",
            Self::Presentation => "presentation",
            Self::Named(name) => name,
        }
    }

    /// Parse a wire label.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label {
            "self" => Self::Main,
            "presentation" => Self::Presentation,
            other => Self::Named(other.to_string()),
        }
    }
}

/// Opaque handle to a media track owned by the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackHandle(pub String);

/// Media track kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Audio track.
    Audio,
    /// Video track.
    Video,
}

/// Remote subscription quality tier.
///
/// Only ever changed by explicit user selection; automatic bitrate
/// adaptation stays inside the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionQuality {
    /// Lowest simulcast layer.
    Low,
    /// Middle simulcast layer.
    Medium,
    /// Highest simulcast layer.
    High,
}

/// A keyed media publication belonging to one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    /// Owning participant.
    pub owner: ParticipantId,
    /// Publication key.
    pub key: StreamKey,
    /// Audio track handle, if the publication carries audio.
    pub audio: Option<TrackHandle>,
    /// Video track handle, if the publication carries video.
    pub video: Option<TrackHandle>,
    /// Whether the audio track is enabled.
    pub audio_enabled: bool,
    /// Whether the video track is enabled.
    pub video_enabled: bool,
    /// True once the publish/subscribe handshake has completed.
    pub configured: bool,
    /// Audio muted by a moderator.
    pub censored: bool,
}

impl Stream {
    /// A not-yet-configured stream with the given tracks.
    pub fn new(
        owner: ParticipantId,
        key: StreamKey,
        audio: Option<TrackHandle>,
        video: Option<TrackHandle>,
    ) -> Self {
        Self {
            owner,
            key,
            audio,
            video,
            audio_enabled: true,
            video_enabled: true,
            configured: false,
            censored: false,
        }
    }
}

/// A chat entry in the append-only message log.
///
/// The sender name is denormalized at receipt time so the log survives the
/// sender leaving the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Sender identity.
    pub sender: ParticipantId,
    /// Sender display name at the time of receipt.
    pub sender_name: String,
    /// Message body.
    pub payload: String,
    /// Explicit recipients; `None` means broadcast.
    pub recipients: Option<Vec<ParticipantId>>,
}

/// One network-quality report for a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualitySample {
    /// Uplink quality, 0 (unusable) to 5 (excellent).
    pub uplink: u8,
    /// Downlink quality, 0 (unusable) to 5 (excellent).
    pub downlink: u8,
}

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No connection and none in flight.
    #[default]
    Disconnected,
    /// Connection attempt in flight.
    Connecting,
    /// Session established.
    Connected,
}

/// Immutable view of the whole session at one instant.
///
/// Produced by the session state machine after every event and shared by
/// reference (`Arc`). Consumers never observe a partially-updated snapshot:
/// the session replaces the whole value atomically.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    /// Connection lifecycle state.
    pub status: ConnectionStatus,
    /// The local participant's id, once known.
    pub local_id: Option<ParticipantId>,
    /// Every participant currently in the room, including the local one.
    pub participants: HashMap<ParticipantId, Participant>,
    /// Every known stream, keyed by owner and publication key.
    pub streams: HashMap<(ParticipantId, StreamKey), Stream>,
    /// Server-mixed room audio track, when the SDK provides one.
    pub mixed_audio: Option<TrackHandle>,
    /// Append-only chat log in event-processing order.
    pub messages: Vec<ChatMessage>,
    /// Messages received since the chat panel was last opened.
    pub unread_count: usize,
    /// Render priority order; the local participant is always first.
    pub activity_order: Vec<ParticipantId>,
    /// Most recently active remote speaker, if within the expiry window.
    pub dominant_speaker: Option<ParticipantId>,
    /// Participant currently publishing a presentation stream.
    pub presenter: Option<ParticipantId>,
    /// Latest network-quality report per participant, replaced wholesale.
    pub metrics: HashMap<ParticipantId, QualitySample>,
    /// Whether the local camera track is currently enabled.
    pub camera_active: bool,
}

impl SessionSnapshot {
    /// Look up a stream by owner and key.
    #[must_use]
    pub fn stream(&self, owner: &ParticipantId, key: &StreamKey) -> Option<&Stream> {
        self.streams.get(&(owner.clone(), key.clone()))
    }

    /// Participants in render priority order.
    pub fn ordered_participants(&self) -> impl Iterator<Item = &Participant> {
        self.activity_order.iter().filter_map(|id| self.participants.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_id() {
        let bare = Participant::new("p-1", ParticipantOrigin::Remote, serde_json::Value::Null);
        assert_eq!(bare.display_name(), "p-1");

        let named = Participant::new(
            "p-2",
            ParticipantOrigin::Remote,
            serde_json::json!({ "displayName": "Ada" }),
        );
        assert_eq!(named.display_name(), "Ada");
    }

    #[test]
    fn message_capability_defaults_to_true() {
        let bare = Participant::new("p-1", ParticipantOrigin::Remote, serde_json::json!({}));
        assert!(bare.can_receive_messages());

        let phone = Participant::new(
            "p-2",
            ParticipantOrigin::TelephonyEngine,
            serde_json::json!({ "canReceiveMessages": false }),
        );
        assert!(!phone.can_receive_messages());
    }

    #[test]
    fn stream_key_wire_labels_round_trip() {
        for key in [StreamKey::Main, StreamKey::Presentation, StreamKey::Named("aux".into())] {
            assert_eq!(StreamKey::parse(key.as_str()), key);
        }
    }
}
