//! Room session state machine for gridcall.
//!
//! The [`RoomSession`] is the single authoritative owner of one room
//! connection. It consumes the external media SDK's events as a typed
//! [`SessionEvent`] stream and produces [`SessionAction`] commands for a
//! driver to execute against the SDK, the token endpoint, and the
//! notification surface.
//!
//! The session is a pure state machine: no I/O, no clock access. Time enters
//! as an `Instant` parameter, so the same code runs against the system clock
//! in production and a virtual clock in simulation. After every event the
//! session publishes an immutable [`SessionSnapshot`] that UI consumers share
//! by reference; a snapshot is replaced wholesale, never mutated in place.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod event;
mod model;
mod reconciler;
mod session;
mod token;

pub use event::{Notification, SessionAction, SessionEvent, StreamTracks};
pub use model::{
    ChatMessage, ConnectionStatus, Participant, ParticipantId, ParticipantOrigin, QualitySample,
    SessionSnapshot, Stream, StreamKey, SubscriptionQuality, TrackHandle, TrackKind,
};
pub use reconciler::SubscriptionReconciler;
pub use session::RoomSession;
pub use token::TokenRefresh;
