//! End-to-end tests for runtime orchestration under virtual time.
//!
//! # Test Strategy
//!
//! Each test simulates what a frontend does in a real session:
//! 1. Inject user commands and SDK events into the simulation driver
//! 2. Process cycles through Runtime → App → Bridge → RoomSession
//! 3. Advance the virtual clock to trigger timers
//! 4. Verify the executed SDK commands and the resulting app state
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks that verify:
//! - The driver executed the expected SDK commands, in order
//! - App state reflects the expected session snapshot
//! - Timers fire on schedule and stop on disconnect

use std::time::Duration;

use gridcall_app::{AppEvent, Runtime, UserCommand};
use gridcall_core::{DisconnectReason, SessionConfig};
use gridcall_harness::{SimDriver, SimEnv};
use gridcall_session::{
    ConnectionStatus, Participant, ParticipantId, ParticipantOrigin, SessionAction, SessionEvent,
    Stream, StreamKey,
};

fn remote(id: &str, name: &str) -> Participant {
    Participant::new(id, ParticipantOrigin::Remote, serde_json::json!({ "displayName": name }))
}

fn local(id: &str) -> Participant {
    Participant::new(id, ParticipantOrigin::Local, serde_json::json!({ "displayName": "Me" }))
}

fn connected_event() -> SessionEvent {
    SessionEvent::Connected {
        local: local("me"),
        participants: vec![remote("a", "Ada")],
        streams: vec![Stream::new(ParticipantId::from("a"), StreamKey::Main, None, None)],
        mixed_audio: None,
    }
}

/// Build a runtime over a fresh simulation driver, returning a driver handle
/// for injection and assertions.
fn runtime() -> (SimDriver, Runtime<SimDriver>) {
    let driver = SimDriver::default();
    let handle = driver.clone();
    (handle, Runtime::new(driver, SessionConfig::default()))
}

/// Process cycles until the driver has no pending events.
async fn settle(runtime: &mut Runtime<SimDriver>, driver: &SimDriver) {
    while driver.has_pending() {
        let quit = runtime.process_cycle().await.unwrap();
        assert!(!quit);
    }
}

#[tokio::test]
async fn connect_command_flows_through_to_the_sdk() {
    let (driver, mut runtime) = runtime();

    driver.inject_event(AppEvent::Command(UserCommand::Connect {
        room_id: "room-1".into(),
        token: "tok".into(),
    }));
    settle(&mut runtime, &driver).await;

    let executed = driver.take_executed();
    assert!(
        matches!(executed.as_slice(), [SessionAction::Connect { room_id, .. }] if room_id == "room-1")
    );

    driver.inject_session_event(connected_event());
    settle(&mut runtime, &driver).await;

    // Oracle: the app sees the connected room and the remote is subscribed
    assert_eq!(runtime.app().snapshot().status, ConnectionStatus::Connected);
    let executed = driver.take_executed();
    assert!(executed.iter().any(|a| matches!(
        a,
        SessionAction::AddSubscription { participant, .. } if participant.as_str() == "a"
    )));
}

#[tokio::test]
async fn token_refresh_fires_on_schedule_and_stops_after_disconnect() {
    let env = SimEnv::new();
    let driver = SimDriver::new(env.clone()).with_auto_token();
    let handle = driver.clone();
    let mut runtime = Runtime::new(driver, SessionConfig::default());

    handle.inject_event(AppEvent::Command(UserCommand::Connect {
        room_id: "room-1".into(),
        token: "tok".into(),
    }));
    handle.inject_session_event(connected_event());
    settle(&mut runtime, &handle).await;
    let _ = handle.take_executed();

    // TTL 50s, lead 20s: a request every 30 seconds
    env.advance(Duration::from_secs(30));
    let _ = runtime.process_cycle().await.unwrap();
    settle(&mut runtime, &handle).await;

    let executed = handle.take_executed();
    assert!(executed.iter().any(|a| matches!(a, SessionAction::RequestToken)));
    assert!(executed.iter().any(|a| matches!(
        a,
        SessionAction::UpdateToken { token } if token == "sim-token-1"
    )));

    env.advance(Duration::from_secs(30));
    let _ = runtime.process_cycle().await.unwrap();
    settle(&mut runtime, &handle).await;

    let executed = handle.take_executed();
    assert!(executed.iter().any(|a| matches!(
        a,
        SessionAction::UpdateToken { token } if token == "sim-token-2"
    )));

    // Disconnect tears the schedule down within one interval
    handle.inject_session_event(SessionEvent::Disconnected {
        reason: DisconnectReason::NetworkError,
    });
    settle(&mut runtime, &handle).await;
    let _ = handle.take_executed();

    env.advance(Duration::from_secs(120));
    let _ = runtime.process_cycle().await.unwrap();
    settle(&mut runtime, &handle).await;

    let executed = handle.take_executed();
    assert!(!executed.iter().any(|a| matches!(a, SessionAction::RequestToken)));
}

#[tokio::test]
async fn dominant_speaker_expires_under_virtual_time() {
    let env = SimEnv::new();
    let driver = SimDriver::new(env.clone());
    let handle = driver.clone();
    let mut runtime = Runtime::new(driver, SessionConfig::default());

    handle.inject_event(AppEvent::Command(UserCommand::Connect {
        room_id: "room-1".into(),
        token: "tok".into(),
    }));
    handle.inject_session_event(connected_event());
    handle.inject_session_event(SessionEvent::AudioActivity {
        id: ParticipantId::from("a"),
        key: None,
    });
    settle(&mut runtime, &handle).await;

    assert_eq!(runtime.app().snapshot().dominant_speaker, Some(ParticipantId::from("a")));

    env.advance(Duration::from_secs(5));
    let _ = runtime.process_cycle().await.unwrap();

    assert_eq!(runtime.app().snapshot().dominant_speaker, None);
}

#[tokio::test]
async fn kicked_local_participant_ends_the_session() {
    let (driver, mut runtime) = runtime();

    driver.inject_event(AppEvent::Command(UserCommand::Connect {
        room_id: "room-1".into(),
        token: "tok".into(),
    }));
    driver.inject_session_event(connected_event());
    driver.inject_session_event(SessionEvent::ParticipantLeaving {
        id: ParticipantId::from("me"),
        kicked: true,
    });
    settle(&mut runtime, &driver).await;

    // Oracle: session torn down and the user told why
    assert_eq!(runtime.app().snapshot().status, ConnectionStatus::Disconnected);
    assert!(runtime.app().notifications().any(|n| n.title() == "Removed from room"));
}

#[tokio::test]
async fn quit_command_ends_the_run_loop() {
    let (driver, runtime) = runtime();

    driver.inject_event(AppEvent::Command(UserCommand::Quit));
    runtime.run().await.unwrap();

    // The initial render happened before the loop ended
    assert!(driver.render_count() >= 1);
}

#[tokio::test]
async fn chat_round_trip_through_the_runtime() {
    let (driver, mut runtime) = runtime();

    driver.inject_event(AppEvent::Command(UserCommand::Connect {
        room_id: "room-1".into(),
        token: "tok".into(),
    }));
    driver.inject_session_event(connected_event());
    settle(&mut runtime, &driver).await;
    let _ = driver.take_executed();

    driver.inject_event(AppEvent::Command(UserCommand::SendChat { payload: "hello".into() }));
    settle(&mut runtime, &driver).await;

    // The send reached the SDK but the log waits for the echo
    let executed = driver.take_executed();
    assert!(matches!(executed.as_slice(), [SessionAction::SendMessage { payload, .. }] if payload == "hello"));
    assert!(runtime.app().snapshot().messages.is_empty());

    driver.inject_session_event(SessionEvent::MessageReceived {
        sender: ParticipantId::from("a"),
        payload: "hi back".into(),
        recipients: None,
    });
    settle(&mut runtime, &driver).await;

    assert_eq!(runtime.app().snapshot().messages.len(), 1);
    assert_eq!(runtime.app().snapshot().unread_count, 1);

    driver.inject_event(AppEvent::Command(UserCommand::OpenChat));
    settle(&mut runtime, &driver).await;
    assert_eq!(runtime.app().snapshot().unread_count, 0);
}
