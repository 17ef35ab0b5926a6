//! Core primitives shared by every gridcall crate.
//!
//! This crate owns the pieces the session and layout engines build on but
//! that carry no conferencing semantics of their own:
//!
//! - [`Environment`]: abstraction over time and randomness so the same state
//!   machines run against the system clock in production and a virtual clock
//!   in simulation.
//! - [`DebounceTimer`]: cancellable single-deadline timer where arming always
//!   supersedes the previous deadline. Used for dominant-speaker expiry and
//!   the invite join-acknowledgement timeout.
//! - [`SessionConfig`]: explicit session-scoped configuration passed by
//!   reference into the state machines. There are no process-wide globals.
//! - [`SessionError`]: the error taxonomy for connection, device, and
//!   credential failures.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod env;
mod error;
mod timer;

pub use config::SessionConfig;
pub use env::{Environment, SystemEnv};
pub use error::{DeviceKind, DisconnectReason, SessionError, UserFacing};
pub use timer::DebounceTimer;
