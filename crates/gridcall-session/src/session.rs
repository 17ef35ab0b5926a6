//! Room session state machine.
//!
//! Manages the connection lifecycle, normalizes the SDK's unordered event
//! stream into one consistent view, and drives subscriptions, notifications,
//! and credential refresh. Uses the action pattern: methods take time as
//! input and return actions for the driver to execute. This keeps the state
//! machine pure (no I/O) and makes testing straightforward.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────┐  connect   ┌────────────┐  Connected event  ┌───────────┐
//! │ Disconnected │───────────>│ Connecting │──────────────────>│ Connected │
//! └──────────────┘            └────────────┘                   └───────────┘
//!        ↑                          │                                │
//!        │     Disconnected event / │ disconnect / kicked            │
//!        └──────────────────────────┴────────────────────────────────┘
//! ```
//!
//! `connect` while connecting or connected is a no-op, not an error.

use std::{
    collections::HashMap,
    ops::Sub,
    sync::Arc,
    time::{Duration, Instant},
};

use gridcall_core::{DebounceTimer, DisconnectReason, SessionConfig};

use crate::{
    event::{Notification, SessionAction, SessionEvent, StreamTracks},
    model::{
        ChatMessage, ConnectionStatus, Participant, ParticipantId, QualitySample, SessionSnapshot,
        Stream, StreamKey, SubscriptionQuality, TrackHandle, TrackKind,
    },
    reconciler::SubscriptionReconciler,
    token::TokenRefresh,
};

/// Single authoritative owner of one room connection.
///
/// Consumes [`SessionEvent`]s in dispatch order and produces
/// [`SessionAction`]s; publishes an immutable [`SessionSnapshot`] after every
/// change. Handlers never block and never panic on expected conditions:
/// events referring to state that has since moved on are dropped with a
/// debug log.
///
/// Generic over `Instant` to support both real time and virtual time for
/// deterministic testing.
#[derive(Debug, Clone)]
pub struct RoomSession<I = Instant>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    config: SessionConfig,
    status: ConnectionStatus,
    local_id: Option<ParticipantId>,
    participants: HashMap<ParticipantId, Participant>,
    streams: HashMap<(ParticipantId, StreamKey), Stream>,
    mixed_audio: Option<TrackHandle>,
    messages: Vec<ChatMessage>,
    unread_count: usize,
    activity: Vec<ParticipantId>,
    dominant_speaker: Option<ParticipantId>,
    presenter: Option<ParticipantId>,
    metrics: HashMap<ParticipantId, QualitySample>,
    camera_active: bool,
    reconciler: SubscriptionReconciler,
    speaker_timer: DebounceTimer<I>,
    join_timer: DebounceTimer<I>,
    pending_invite: Option<String>,
    token: TokenRefresh<I>,
    snapshot: Arc<SessionSnapshot>,
}

impl<I> RoomSession<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create a disconnected session with the given configuration.
    pub fn new(config: SessionConfig) -> Self {
        let speaker_timer = DebounceTimer::new(config.speaker_expiry);
        let join_timer = DebounceTimer::new(config.join_ack_timeout);
        let token = TokenRefresh::new(config.token_refresh_interval());

        Self {
            config,
            status: ConnectionStatus::Disconnected,
            local_id: None,
            participants: HashMap::new(),
            streams: HashMap::new(),
            mixed_audio: None,
            messages: Vec::new(),
            unread_count: 0,
            activity: Vec::new(),
            dominant_speaker: None,
            presenter: None,
            metrics: HashMap::new(),
            camera_active: false,
            reconciler: SubscriptionReconciler::new(),
            speaker_timer,
            join_timer,
            pending_invite: None,
            token,
            snapshot: Arc::new(SessionSnapshot::default()),
        }
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current connection status.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// The local participant id, once connected.
    pub fn local_id(&self) -> Option<&ParticipantId> {
        self.local_id.as_ref()
    }

    /// The current immutable snapshot.
    ///
    /// Cheap to call; the `Arc` is shared, the snapshot itself is only
    /// rebuilt when state changes.
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Begin connecting to a room.
    ///
    /// Idempotent: while a connection attempt is in flight or established
    /// this is a no-op and issues no SDK commands. Failure is reported
    /// asynchronously via [`SessionEvent::Disconnected`] with
    /// [`DisconnectReason::NetworkError`]; there is no automatic retry.
    pub fn connect(&mut self, room_id: impl Into<String>, token: impl Into<String>) -> Vec<SessionAction> {
        if self.status != ConnectionStatus::Disconnected {
            tracing::debug!(status = ?self.status, "connect ignored; attempt already in flight");
            return vec![];
        }

        self.status = ConnectionStatus::Connecting;
        self.publish();
        vec![SessionAction::Connect { room_id: room_id.into(), token: token.into() }]
    }

    /// Tear down the active connection.
    ///
    /// Always succeeds locally; the remote notification is best-effort.
    pub fn disconnect(&mut self, reason: DisconnectReason) -> Vec<SessionAction> {
        if self.status == ConnectionStatus::Disconnected {
            return vec![];
        }

        self.teardown();
        self.publish();
        vec![SessionAction::Disconnect { reason }]
    }

    /// Publish a local stream under a key.
    pub fn add_stream(&mut self, key: StreamKey, tracks: StreamTracks) -> Vec<SessionAction> {
        if self.status != ConnectionStatus::Connected {
            tracing::warn!(key = key.as_str(), "add_stream ignored; not connected");
            return vec![];
        }
        vec![SessionAction::AddStream { key, tracks }]
    }

    /// Replace the tracks of a published local stream.
    pub fn update_stream(&mut self, key: StreamKey, tracks: StreamTracks) -> Vec<SessionAction> {
        if self.status != ConnectionStatus::Connected {
            tracing::warn!(key = key.as_str(), "update_stream ignored; not connected");
            return vec![];
        }
        vec![SessionAction::UpdateStream { key, tracks }]
    }

    /// Retract a published local stream.
    pub fn remove_stream(&mut self, key: StreamKey) -> Vec<SessionAction> {
        if self.status != ConnectionStatus::Connected {
            tracing::warn!(key = key.as_str(), "remove_stream ignored; not connected");
            return vec![];
        }
        vec![SessionAction::RemoveStream { key }]
    }

    /// Send a chat message.
    ///
    /// Does not touch the local message log: the log is only updated by the
    /// inbound echo event, so there is a single source of truth for order.
    pub fn send_message(
        &mut self,
        payload: impl Into<String>,
        recipients: Option<Vec<ParticipantId>>,
    ) -> Vec<SessionAction> {
        if self.status != ConnectionStatus::Connected {
            tracing::warn!("send_message ignored; not connected");
            return vec![];
        }
        vec![SessionAction::SendMessage { payload: payload.into(), recipients }]
    }

    /// Change subscription quality for a remote stream.
    ///
    /// Only issued for explicit user selections; the session never infers
    /// quality changes from network metrics.
    pub fn set_subscription_quality(
        &mut self,
        participant: &ParticipantId,
        key: &StreamKey,
        quality: SubscriptionQuality,
    ) -> Vec<SessionAction> {
        self.reconciler.quality_change(participant, key, quality).into_iter().collect()
    }

    /// Record an outstanding invite and arm the join-acknowledgement timer.
    ///
    /// Any subsequent join cancels the timer; expiry surfaces a timeout
    /// notification on a later tick. Re-inviting supersedes the previous
    /// pending invite.
    pub fn invite(&mut self, target: impl Into<String>, now: I) -> Vec<SessionAction> {
        if self.status != ConnectionStatus::Connected {
            tracing::warn!("invite ignored; not connected");
            return vec![];
        }

        let target = target.into();
        self.pending_invite = Some(target.clone());
        self.join_timer.arm(now);
        vec![SessionAction::DialOut { target }]
    }

    /// Clear the unread message counter. Called when the chat panel opens.
    pub fn mark_chat_read(&mut self) {
        if self.unread_count > 0 {
            self.unread_count = 0;
            self.publish();
        }
    }

    /// Process one SDK event.
    ///
    /// Handlers run in dispatch order, one at a time; each updates derived
    /// state atomically (the snapshot is republished once per event).
    pub fn handle(&mut self, event: SessionEvent, now: I) -> Vec<SessionAction> {
        let actions = match event {
            SessionEvent::Connected { local, participants, streams, mixed_audio } => {
                self.on_connected(local, participants, streams, mixed_audio)
            },
            SessionEvent::Disconnected { reason } => self.on_disconnected(reason),
            SessionEvent::ParticipantJoined { participant } => self.on_participant_joined(participant),
            SessionEvent::ParticipantLeaving { id, kicked } => self.on_participant_leaving(&id, kicked),
            SessionEvent::ParticipantLeft { id } => self.on_participant_left(&id),
            SessionEvent::StreamPublished { stream } => self.on_stream_published(stream),
            SessionEvent::StreamUnpublished { owner, key } => self.on_stream_unpublished(&owner, &key),
            SessionEvent::TrackEnabled { owner, key, kind } => {
                self.on_track_toggle(&owner, &key, kind, true)
            },
            SessionEvent::TrackDisabled { owner, key, kind } => {
                self.on_track_toggle(&owner, &key, kind, false)
            },
            SessionEvent::TrackCensored { owner, kind } => self.on_censor(&owner, kind, true),
            SessionEvent::TrackUncensored { owner, kind } => self.on_censor(&owner, kind, false),
            SessionEvent::AudioActivity { id, key } => self.on_audio_activity(id, key, now),
            SessionEvent::MessageReceived { sender, payload, recipients } => {
                self.on_message(sender, payload, recipients)
            },
            SessionEvent::NetworkMetrics { reports } => {
                self.metrics = reports;
                vec![]
            },
            SessionEvent::TokenRefreshed { token } => {
                if self.status == ConnectionStatus::Connected {
                    vec![SessionAction::UpdateToken { token }]
                } else {
                    vec![]
                }
            },
            SessionEvent::TokenRefreshFailed { detail } => {
                // Best-effort: the next interval retries; never surfaced
                tracing::debug!(detail, "credential refresh failed");
                vec![]
            },
        };

        self.publish();
        actions
    }

    /// Process periodic maintenance (expiry timers and credential refresh).
    pub fn tick(&mut self, now: I) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        let mut changed = false;

        if let Some(action) = self.token.tick(now) {
            actions.push(action);
        }

        if self.speaker_timer.fire_if_due(now) && self.dominant_speaker.take().is_some() {
            tracing::debug!("dominant speaker expired");
            changed = true;
        }

        if self.join_timer.fire_if_due(now)
            && let Some(target) = self.pending_invite.take()
        {
            actions.push(SessionAction::Notify(Notification::InviteTimedOut { target }));
        }

        if changed {
            self.publish();
        }
        actions
    }

    fn on_connected(
        &mut self,
        local: Participant,
        participants: Vec<Participant>,
        streams: Vec<Stream>,
        mixed_audio: Option<TrackHandle>,
    ) -> Vec<SessionAction> {
        self.status = ConnectionStatus::Connected;
        self.local_id = Some(local.id.clone());
        self.mixed_audio = mixed_audio;

        // Re-seed from the event wholesale; nothing from a previous
        // connection epoch survives
        self.participants.clear();
        self.streams.clear();
        self.metrics.clear();
        self.presenter = None;
        self.dominant_speaker = None;
        self.speaker_timer.cancel();
        self.activity.clear();
        self.activity.push(local.id.clone());
        self.participants.insert(local.id.clone(), local.clone());
        for participant in participants {
            self.activity.push(participant.id.clone());
            self.participants.insert(participant.id.clone(), participant);
        }

        self.reconciler.reset(local.id);
        self.token.start();

        let mut actions = Vec::new();
        for stream in streams {
            if stream.key == StreamKey::Presentation {
                self.presenter = Some(stream.owner.clone());
            }
            actions.extend(self.reconciler.evaluate(&stream));
            self.streams.insert((stream.owner.clone(), stream.key.clone()), stream);
        }

        actions.push(SessionAction::EnableMetricsReports {
            ids: self.activity.clone(),
        });

        tracing::info!(participants = self.participants.len(), "session connected");
        actions
    }

    fn on_disconnected(&mut self, reason: DisconnectReason) -> Vec<SessionAction> {
        let was_active = self.status != ConnectionStatus::Disconnected;
        self.teardown();

        match reason {
            DisconnectReason::NetworkError | DisconnectReason::TimedOut if was_active => {
                vec![SessionAction::Notify(Notification::ConnectionLost { reason })]
            },
            _ => vec![],
        }
    }

    fn on_participant_joined(&mut self, participant: Participant) -> Vec<SessionAction> {
        // Any join acknowledges the outstanding invite
        self.join_timer.cancel();
        self.pending_invite = None;

        let name = participant.display_name().to_string();
        let id = participant.id.clone();
        self.participants.insert(id.clone(), participant);
        if !self.activity.contains(&id) {
            self.activity.push(id.clone());
        }

        // Streams can race ahead of the join event; re-evaluate any the
        // joiner already published (the reconciler dedupes)
        let mut actions: Vec<SessionAction> = Vec::new();
        for ((owner, _), stream) in &self.streams {
            if *owner == id {
                actions.extend(self.reconciler.evaluate(stream));
            }
        }

        actions.push(SessionAction::Notify(Notification::ParticipantJoined { name }));
        actions
    }

    fn on_participant_leaving(&mut self, id: &ParticipantId, kicked: bool) -> Vec<SessionAction> {
        if !kicked {
            tracing::debug!(%id, "participant leaving");
            return vec![];
        }

        if self.local_id.as_ref() == Some(id) {
            // Equivalent to a user-initiated disconnect for cleanup
            self.teardown();
            return vec![SessionAction::Notify(Notification::KickedLocally)];
        }

        let name = self.display_name(id);
        vec![SessionAction::Notify(Notification::ParticipantKicked { name })]
    }

    fn on_participant_left(&mut self, id: &ParticipantId) -> Vec<SessionAction> {
        self.participants.remove(id);
        self.streams.retain(|(owner, _), _| owner != id);
        self.activity.retain(|p| p != id);
        self.metrics.remove(id);
        self.reconciler.forget_participant(id);

        if self.presenter.as_ref() == Some(id) {
            self.presenter = None;
        }
        if self.dominant_speaker.as_ref() == Some(id) {
            self.dominant_speaker = None;
            self.speaker_timer.cancel();
        }
        vec![]
    }

    fn on_stream_published(&mut self, stream: Stream) -> Vec<SessionAction> {
        if stream.key == StreamKey::Presentation {
            self.presenter = Some(stream.owner.clone());
        }

        let action = self.reconciler.evaluate(&stream);
        self.streams.insert((stream.owner.clone(), stream.key.clone()), stream);
        action.into_iter().collect()
    }

    fn on_stream_unpublished(&mut self, owner: &ParticipantId, key: &StreamKey) -> Vec<SessionAction> {
        self.streams.remove(&(owner.clone(), key.clone()));
        self.reconciler.forget_stream(owner, key);

        // Unsubscription is implicit in the publish lifecycle; only the
        // presenter record is cleared here
        if *key == StreamKey::Presentation && self.presenter.as_ref() == Some(owner) {
            self.presenter = None;
        }
        vec![]
    }

    fn on_track_toggle(
        &mut self,
        owner: &ParticipantId,
        key: &StreamKey,
        kind: TrackKind,
        enabled: bool,
    ) -> Vec<SessionAction> {
        if let Some(stream) = self.streams.get_mut(&(owner.clone(), key.clone())) {
            match kind {
                TrackKind::Audio => stream.audio_enabled = enabled,
                TrackKind::Video => stream.video_enabled = enabled,
            }
        }

        // Last-write-wins: the flag reflects only the most recent event
        if kind == TrackKind::Video && *key == StreamKey::Main && self.local_id.as_ref() == Some(owner)
        {
            self.camera_active = enabled;
        }
        vec![]
    }

    fn on_censor(&mut self, owner: &ParticipantId, kind: TrackKind, censored: bool) -> Vec<SessionAction> {
        if kind != TrackKind::Audio {
            tracing::debug!(%owner, "ignoring non-audio censor event");
            return vec![];
        }

        if let Some(stream) = self.streams.get_mut(&(owner.clone(), StreamKey::Main)) {
            stream.censored = censored;
        }

        let notification = if self.local_id.as_ref() == Some(owner) {
            if censored { Notification::CensoredLocally } else { Notification::UncensoredLocally }
        } else {
            let name = self.display_name(owner);
            if censored { Notification::Censored { name } } else { Notification::Uncensored { name } }
        };
        vec![SessionAction::Notify(notification)]
    }

    fn on_audio_activity(
        &mut self,
        id: ParticipantId,
        key: Option<StreamKey>,
        now: I,
    ) -> Vec<SessionAction> {
        if self.local_id.as_ref() == Some(&id) {
            return vec![];
        }
        if !matches!(key, None | Some(StreamKey::Main)) {
            return vec![];
        }
        if !self.participants.contains_key(&id) {
            tracing::debug!(%id, "activity from unknown participant dropped");
            return vec![];
        }

        // Every event re-arms the full expiry window, superseding the prior
        // deadline; expiry is debounced, not per-speaker
        self.dominant_speaker = Some(id.clone());
        self.speaker_timer.arm(now);
        self.promote_after_local(&id);
        vec![]
    }

    fn on_message(
        &mut self,
        sender: ParticipantId,
        payload: String,
        recipients: Option<Vec<ParticipantId>>,
    ) -> Vec<SessionAction> {
        let sender_name = self.display_name(&sender);
        let from_local = self.local_id.as_ref() == Some(&sender);

        self.messages.push(ChatMessage { sender, sender_name, payload, recipients });
        // Echoes of our own sends appear in the log but never count as unread
        if !from_local {
            self.unread_count += 1;
        }
        vec![]
    }

    /// Display name for a participant, falling back to the raw id when the
    /// participant is already gone.
    fn display_name(&self, id: &ParticipantId) -> String {
        self.participants
            .get(id)
            .map_or_else(|| id.as_str().to_string(), |p| p.display_name().to_string())
    }

    /// Move a participant to the front of the activity order, directly after
    /// the pinned local participant.
    fn promote_after_local(&mut self, id: &ParticipantId) {
        if self.local_id.as_ref() == Some(id) {
            return;
        }
        self.activity.retain(|p| p != id);

        let after_local =
            usize::from(self.activity.first().is_some_and(|first| Some(first) == self.local_id.as_ref()));
        let at = after_local.min(self.activity.len());
        self.activity.insert(at, id.clone());
    }

    /// Reset all connection-scoped state. The message log and unread counter
    /// survive; they belong to the room visit, not the transport.
    fn teardown(&mut self) {
        self.status = ConnectionStatus::Disconnected;
        self.participants.clear();
        self.streams.clear();
        self.mixed_audio = None;
        self.activity.clear();
        self.dominant_speaker = None;
        self.presenter = None;
        self.metrics.clear();
        self.camera_active = false;
        self.reconciler.clear();
        self.speaker_timer.cancel();
        self.join_timer.cancel();
        self.pending_invite = None;
        self.token.stop();
    }

    /// Replace the published snapshot wholesale.
    fn publish(&mut self) {
        self.snapshot = Arc::new(SessionSnapshot {
            status: self.status,
            local_id: self.local_id.clone(),
            participants: self.participants.clone(),
            streams: self.streams.clone(),
            mixed_audio: self.mixed_audio.clone(),
            messages: self.messages.clone(),
            unread_count: self.unread_count,
            activity_order: self.activity.clone(),
            dominant_speaker: self.dominant_speaker.clone(),
            presenter: self.presenter.clone(),
            metrics: self.metrics.clone(),
            camera_active: self.camera_active,
        });
    }
}

impl<I> RoomSession<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Default session used by tests and demos.
    pub fn with_defaults() -> Self {
        Self::new(SessionConfig::default())
    }
}
