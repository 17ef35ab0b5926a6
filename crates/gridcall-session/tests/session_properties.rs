//! Property-based tests for the room session state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences.
//! This ensures behavioral correctness across all possible execution paths.

use std::time::{Duration, Instant};

use gridcall_core::DisconnectReason;
use gridcall_session::{
    ConnectionStatus, Participant, ParticipantId, ParticipantOrigin, RoomSession, SessionAction,
    SessionEvent, Stream, StreamKey,
};
use proptest::prelude::*;

const LOCAL: &str = "me";

/// Operations a fuzzer-like event schedule can apply to a session.
#[derive(Debug, Clone)]
enum Op {
    Join(u8),
    Leave(u8),
    Publish(u8),
    PublishLocal,
    Unpublish(u8),
    Activity(u8),
    Message { sender: u8, text: String },
    Tick { advance_secs: u8 },
    Drop,
    Reconnect,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u8..5).prop_map(Op::Join),
        2 => (0u8..5).prop_map(Op::Leave),
        2 => (0u8..5).prop_map(Op::Publish),
        1 => Just(Op::PublishLocal),
        1 => (0u8..5).prop_map(Op::Unpublish),
        3 => (0u8..5).prop_map(Op::Activity),
        2 => ((0u8..5), "[a-z]{1,8}").prop_map(|(sender, text)| Op::Message { sender, text }),
        2 => (0u8..10).prop_map(|advance_secs| Op::Tick { advance_secs }),
        1 => Just(Op::Drop),
        1 => Just(Op::Reconnect),
    ]
}

fn remote_id(index: u8) -> ParticipantId {
    ParticipantId::new(format!("p{index}"))
}

fn remote(index: u8) -> Participant {
    Participant::new(
        remote_id(index),
        ParticipantOrigin::Remote,
        serde_json::json!({ "displayName": format!("Peer {index}") }),
    )
}

fn local_participant() -> Participant {
    Participant::new(LOCAL, ParticipantOrigin::Local, serde_json::json!({ "displayName": "Me" }))
}

/// Connect a fresh session at the given instant.
fn connect(session: &mut RoomSession<Instant>, now: Instant) -> Vec<SessionAction> {
    let mut actions = session.connect("room-1", "tok");
    actions.extend(session.handle(
        SessionEvent::Connected {
            local: local_participant(),
            participants: vec![],
            streams: vec![],
            mixed_audio: None,
        },
        now,
    ));
    actions
}

/// Apply one operation, returning the actions it produced.
fn apply(session: &mut RoomSession<Instant>, op: &Op, now: &mut Instant) -> Vec<SessionAction> {
    match op {
        Op::Join(index) => {
            session.handle(SessionEvent::ParticipantJoined { participant: remote(*index) }, *now)
        },
        Op::Leave(index) => {
            session.handle(SessionEvent::ParticipantLeft { id: remote_id(*index) }, *now)
        },
        Op::Publish(index) => session.handle(
            SessionEvent::StreamPublished {
                stream: Stream::new(remote_id(*index), StreamKey::Main, None, None),
            },
            *now,
        ),
        Op::PublishLocal => session.handle(
            SessionEvent::StreamPublished {
                stream: Stream::new(ParticipantId::from(LOCAL), StreamKey::Main, None, None),
            },
            *now,
        ),
        Op::Unpublish(index) => session.handle(
            SessionEvent::StreamUnpublished { owner: remote_id(*index), key: StreamKey::Main },
            *now,
        ),
        Op::Activity(index) => {
            session.handle(SessionEvent::AudioActivity { id: remote_id(*index), key: None }, *now)
        },
        Op::Message { sender, text } => session.handle(
            SessionEvent::MessageReceived {
                sender: remote_id(*sender),
                payload: text.clone(),
                recipients: None,
            },
            *now,
        ),
        Op::Tick { advance_secs } => {
            *now += Duration::from_secs(u64::from(*advance_secs));
            session.tick(*now)
        },
        Op::Drop => {
            session.handle(SessionEvent::Disconnected { reason: DisconnectReason::NetworkError }, *now)
        },
        Op::Reconnect => connect(session, *now),
    }
}

proptest! {
    /// The activity order keeps the local participant first for as long as
    /// the session is connected, no matter the join/leave/speaking churn.
    #[test]
    fn prop_local_participant_stays_first(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut now = Instant::now();
        let mut session: RoomSession<Instant> = RoomSession::with_defaults();
        let _ = connect(&mut session, now);

        for op in &ops {
            let _ = apply(&mut session, op, &mut now);

            let snapshot = session.snapshot();
            if snapshot.status == ConnectionStatus::Connected {
                prop_assert_eq!(
                    snapshot.activity_order.first().map(ParticipantId::as_str),
                    Some(LOCAL),
                    "op: {:?}",
                    op
                );
            }
        }
    }

    /// No event schedule can make the session subscribe to its own streams.
    #[test]
    fn prop_never_subscribes_to_local_streams(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut now = Instant::now();
        let mut session: RoomSession<Instant> = RoomSession::with_defaults();
        let _ = connect(&mut session, now);

        for op in &ops {
            for action in apply(&mut session, op, &mut now) {
                if let SessionAction::AddSubscription { participant, .. } = action {
                    prop_assert_ne!(participant.as_str(), LOCAL, "op: {:?}", op);
                }
            }
        }
    }

    /// Every activity-order entry resolves to a live participant: departed
    /// ids are pruned immediately on participant_left.
    #[test]
    fn prop_activity_order_has_no_stale_ids(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut now = Instant::now();
        let mut session: RoomSession<Instant> = RoomSession::with_defaults();
        let _ = connect(&mut session, now);

        for op in &ops {
            let _ = apply(&mut session, op, &mut now);

            let snapshot = session.snapshot();
            for id in &snapshot.activity_order {
                prop_assert!(
                    snapshot.participants.contains_key(id),
                    "stale id {id} after op {:?}",
                    op
                );
            }
            // The dominant speaker and presenter are pruned the same way
            if let Some(speaker) = &snapshot.dominant_speaker {
                prop_assert!(snapshot.participants.contains_key(speaker));
            }
            if let Some(presenter) = &snapshot.presenter {
                prop_assert!(snapshot.participants.contains_key(presenter));
            }
        }
    }

    /// The message log is exactly the inbound echoes in processing order.
    #[test]
    fn prop_message_log_order_is_event_order(
        messages in prop::collection::vec(((0u8..5), "[a-z]{1,8}"), 0..30),
    ) {
        let now = Instant::now();
        let mut session: RoomSession<Instant> = RoomSession::with_defaults();
        let _ = connect(&mut session, now);

        for (sender, text) in &messages {
            let _ = session.handle(
                SessionEvent::MessageReceived {
                    sender: remote_id(*sender),
                    payload: text.clone(),
                    recipients: None,
                },
                now,
            );
        }

        let snapshot = session.snapshot();
        let logged: Vec<&str> = snapshot.messages.iter().map(|m| m.payload.as_str()).collect();
        let expected: Vec<&str> = messages.iter().map(|(_, text)| text.as_str()).collect();
        prop_assert_eq!(logged, expected);
        prop_assert_eq!(snapshot.unread_count, messages.len());
    }

    /// Duplicate subscriptions are never issued: one subscribe per
    /// (participant, key) per connection epoch.
    #[test]
    fn prop_subscriptions_are_unique_per_connection(
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let mut now = Instant::now();
        let mut session: RoomSession<Instant> = RoomSession::with_defaults();
        let _ = connect(&mut session, now);

        let mut seen: std::collections::HashSet<(String, String)> = std::collections::HashSet::new();
        for op in &ops {
            // A new connection epoch legitimately resubscribes everything
            if matches!(op, Op::Drop | Op::Reconnect | Op::Unpublish(_) | Op::Leave(_)) {
                seen.clear();
            }

            for action in apply(&mut session, op, &mut now) {
                if let SessionAction::AddSubscription { participant, key, .. } = action {
                    let entry = (participant.as_str().to_string(), key.as_str().to_string());
                    prop_assert!(seen.insert(entry), "duplicate subscribe after op {:?}", op);
                }
            }
        }
    }
}
