//! Fuzz target for the room session state machine
//!
//! Ensure event-order robustness and the local-first invariant (HIGH priority)
//!
//! # Strategy
//!
//! - Arbitrary interleavings of joins, leaves, publishes, activity, chat,
//!   ticks, drops, and reconnects
//! - Events referring to participants that never joined or already left
//! - Local-owned streams mixed in to probe the self-subscription ban
//!
//! # Invariants
//!
//! - No event sequence panics a handler
//! - The local participant leads the activity order while connected
//! - `AddSubscription` is never issued for the local participant
//! - Activity-order ids always resolve to live participants

#![no_main]

use std::time::{Duration, Instant};

use arbitrary::Arbitrary;
use gridcall_core::DisconnectReason;
use gridcall_session::{
    ConnectionStatus, Participant, ParticipantId, ParticipantOrigin, RoomSession, SessionAction,
    SessionEvent, Stream, StreamKey,
};
use libfuzzer_sys::fuzz_target;

const LOCAL: &str = "me";

#[derive(Debug, Clone, Arbitrary)]
enum SessionOp {
    Join(u8),
    Leaving { index: u8, kicked: bool },
    Left(u8),
    Publish { index: u8, presentation: bool },
    PublishLocal,
    Unpublish(u8),
    Activity(u8),
    ActivityLocal,
    Message { sender: u8, broadcast: bool },
    Censor { index: u8, censored: bool },
    Tick { advance_secs: u8 },
    Drop,
    Reconnect,
}

fn participant_id(index: u8) -> ParticipantId {
    ParticipantId::new(format!("p{}", index % 8))
}

fn participant(index: u8) -> Participant {
    Participant::new(
        participant_id(index),
        ParticipantOrigin::Remote,
        serde_json::json!({ "displayName": format!("Peer {}", index % 8) }),
    )
}

fn stream(owner: ParticipantId, presentation: bool) -> Stream {
    let key = if presentation { StreamKey::Presentation } else { StreamKey::Main };
    Stream::new(owner, key, None, None)
}

fn connect(session: &mut RoomSession<Instant>, now: Instant) {
    let _ = session.connect("fuzz-room", "tok");
    let _ = session.handle(
        SessionEvent::Connected {
            local: Participant::new(LOCAL, ParticipantOrigin::Local, serde_json::json!({})),
            participants: vec![],
            streams: vec![],
            mixed_audio: None,
        },
        now,
    );
}

fuzz_target!(|ops: Vec<SessionOp>| {
    let base = Instant::now();
    let mut now = base;
    let mut session: RoomSession<Instant> = RoomSession::with_defaults();
    connect(&mut session, now);

    for op in ops {
        let event = match op {
            SessionOp::Join(index) => {
                SessionEvent::ParticipantJoined { participant: participant(index) }
            },
            SessionOp::Leaving { index, kicked } => {
                SessionEvent::ParticipantLeaving { id: participant_id(index), kicked }
            },
            SessionOp::Left(index) => SessionEvent::ParticipantLeft { id: participant_id(index) },
            SessionOp::Publish { index, presentation } => SessionEvent::StreamPublished {
                stream: stream(participant_id(index), presentation),
            },
            SessionOp::PublishLocal => SessionEvent::StreamPublished {
                stream: stream(ParticipantId::from(LOCAL), false),
            },
            SessionOp::Unpublish(index) => SessionEvent::StreamUnpublished {
                owner: participant_id(index),
                key: StreamKey::Main,
            },
            SessionOp::Activity(index) => {
                SessionEvent::AudioActivity { id: participant_id(index), key: None }
            },
            SessionOp::ActivityLocal => {
                SessionEvent::AudioActivity { id: ParticipantId::from(LOCAL), key: None }
            },
            SessionOp::Message { sender, broadcast } => SessionEvent::MessageReceived {
                sender: participant_id(sender),
                payload: "fuzz".into(),
                recipients: if broadcast { None } else { Some(vec![ParticipantId::from(LOCAL)]) },
            },
            SessionOp::Censor { index, censored } => {
                let owner = participant_id(index);
                if censored {
                    SessionEvent::TrackCensored { owner, kind: gridcall_session::TrackKind::Audio }
                } else {
                    SessionEvent::TrackUncensored { owner, kind: gridcall_session::TrackKind::Audio }
                }
            },
            SessionOp::Tick { advance_secs } => {
                now += Duration::from_secs(u64::from(advance_secs));
                let _ = session.tick(now);
                continue;
            },
            SessionOp::Drop => {
                SessionEvent::Disconnected { reason: DisconnectReason::NetworkError }
            },
            SessionOp::Reconnect => {
                connect(&mut session, now);
                continue;
            },
        };

        let actions = session.handle(event, now);
        for action in &actions {
            if let SessionAction::AddSubscription { participant, .. } = action {
                assert_ne!(participant.as_str(), LOCAL, "subscribed to own stream");
            }
        }

        let snapshot = session.snapshot();
        if snapshot.status == ConnectionStatus::Connected {
            assert_eq!(
                snapshot.activity_order.first().map(ParticipantId::as_str),
                Some(LOCAL),
                "local participant not first"
            );
        }
        for id in &snapshot.activity_order {
            assert!(snapshot.participants.contains_key(id), "stale activity id {id}");
        }
    }
});
