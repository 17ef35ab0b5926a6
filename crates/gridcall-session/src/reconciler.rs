//! Subscription reconciliation.
//!
//! Decides which remote streams to subscribe to. Evaluated whenever the
//! session connects, a participant joins, or a stream is published.
//!
//! # Rules
//!
//! - Never subscribe to a stream owned by the local participant.
//! - First sight of a remote stream subscribes with audio and video.
//! - Quality changes are issued only for explicit user selections; automatic
//!   bitrate adaptation belongs to the SDK.
//! - Unsubscription is implicit in the publish lifecycle; the reconciler
//!   only forgets state so a republish counts as first sight again.

use std::collections::HashSet;

use crate::{
    event::SessionAction,
    model::{ParticipantId, Stream, StreamKey, SubscriptionQuality},
};

/// Tracks which remote streams this session has subscribed to.
///
/// Cleared on disconnect so every stream is resubscribed after a reconnect.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionReconciler {
    local: Option<ParticipantId>,
    subscribed: HashSet<(ParticipantId, StreamKey)>,
}

impl SubscriptionReconciler {
    /// A reconciler with no local identity and no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a fresh connection under the given local identity.
    pub fn reset(&mut self, local: ParticipantId) {
        self.local = Some(local);
        self.subscribed.clear();
    }

    /// Drop all state on disconnect. Every stream seen after the next
    /// connect is first sight again, which is what forces resubscription.
    pub fn clear(&mut self) {
        self.local = None;
        self.subscribed.clear();
    }

    /// Forget every subscription owned by a departed participant.
    pub fn forget_participant(&mut self, id: &ParticipantId) {
        self.subscribed.retain(|(owner, _)| owner != id);
    }

    /// Forget one unpublished stream so a republish resubscribes.
    pub fn forget_stream(&mut self, owner: &ParticipantId, key: &StreamKey) {
        self.subscribed.remove(&(owner.clone(), key.clone()));
    }

    /// Evaluate a stream, returning a subscribe command on first sight.
    ///
    /// Local streams and already-subscribed streams produce nothing.
    pub fn evaluate(&mut self, stream: &Stream) -> Option<SessionAction> {
        if self.local.as_ref() == Some(&stream.owner) {
            return None;
        }

        let entry = (stream.owner.clone(), stream.key.clone());
        if !self.subscribed.insert(entry) {
            return None;
        }

        tracing::debug!(owner = %stream.owner, key = stream.key.as_str(), "subscribing");
        Some(SessionAction::AddSubscription {
            participant: stream.owner.clone(),
            key: stream.key.clone(),
            audio: true,
            video: true,
        })
    }

    /// Issue a quality change for an explicit user selection.
    ///
    /// Only meaningful for streams this session is subscribed to; requests
    /// for unknown or local streams are dropped.
    pub fn quality_change(
        &self,
        participant: &ParticipantId,
        key: &StreamKey,
        quality: SubscriptionQuality,
    ) -> Option<SessionAction> {
        if self.local.as_ref() == Some(participant) {
            return None;
        }
        if !self.subscribed.contains(&(participant.clone(), key.clone())) {
            return None;
        }

        Some(SessionAction::UpdateSubscription {
            participant: participant.clone(),
            key: key.clone(),
            quality,
        })
    }
}
