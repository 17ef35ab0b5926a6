//! Error types for the gridcall session core.
//!
//! Strongly-typed errors per failure category: connection failures (SDK init,
//! network loss), device failures (permission, availability), and credential
//! refresh failures.
//!
//! Errors at the SDK and browser boundaries are caught there and converted
//! into one of these categories; nothing in this taxonomy is allowed to
//! propagate as an uncaught panic into rendering code.

use thiserror::Error;

/// Machine-readable reason a session ended or failed to establish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// SDK initialization or transport failure.
    NetworkError,
    /// The local user chose to leave.
    UserInitiated,
    /// The connection attempt or session timed out.
    TimedOut,
    /// A moderator removed the local participant.
    Kicked,
}

impl DisconnectReason {
    /// Wire label used by the disconnected callback.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::UserInitiated => "user_initiated",
            Self::TimedOut => "timed_out",
            Self::Kicked => "kicked",
        }
    }
}

/// Device category a media request was issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Audio capture device.
    Microphone,
    /// Video capture device.
    Camera,
    /// Display capture.
    ScreenShare,
}

impl DeviceKind {
    fn label(self) -> &'static str {
        match self {
            Self::Microphone => "microphone",
            Self::Camera => "camera",
            Self::ScreenShare => "screen share",
        }
    }
}

/// A short title plus one-paragraph remediation body, ready to render in a
/// dismissible dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFacing {
    /// Dialog title.
    pub title: String,
    /// Remediation body.
    pub body: String,
}

/// Errors that can occur during session operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Connecting to the room failed before a session was established.
    #[error("connection failed: {detail}")]
    ConnectionFailed {
        /// Human-readable failure description.
        detail: String,
    },

    /// A media device could not be acquired.
    #[error("{} unavailable: {detail}", kind.label())]
    Device {
        /// Which device category failed.
        kind: DeviceKind,
        /// Human-readable failure description.
        detail: String,
        /// The user declined the browser permission prompt.
        permission_denied: bool,
    },

    /// The periodic credential refresh call failed.
    ///
    /// Routine network flakiness tolerated by the TTL margin; retried on the
    /// next scheduled interval and never surfaced to the user.
    #[error("credential refresh failed: {0}")]
    CredentialRefresh(String),

    /// An operation was attempted against a session that is not connected.
    #[error("not connected: cannot {operation}")]
    NotConnected {
        /// Operation that was attempted.
        operation: String,
    },
}

impl SessionError {
    /// Returns true if this error is transient and may succeed on retry.
    ///
    /// Credential refresh failures are always transient. Connection failures
    /// are transient in the sense that a fresh `connect` is safe; device
    /// failures are not, since retrying without user action (granting
    /// permission, plugging in a device) will fail identically.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::CredentialRefresh(_) | Self::ConnectionFailed { .. })
    }

    /// User-visible rendering of this error, if it should be shown at all.
    ///
    /// Credential refresh failures return `None`: surfacing them would spam
    /// notifications for failures the TTL margin already absorbs.
    #[must_use]
    pub fn user_facing(&self) -> Option<UserFacing> {
        match self {
            Self::ConnectionFailed { detail } => Some(UserFacing {
                title: "Connection failed".to_string(),
                body: format!(
                    "The room could not be reached ({detail}). Check your network \
                     connection and try joining again."
                ),
            }),
            Self::Device { kind, permission_denied: true, .. } => Some(UserFacing {
                title: format!("No access to {}", kind.label()),
                body: format!(
                    "Permission to use the {} was denied. Grant access in your \
                     browser's site settings and retry.",
                    kind.label()
                ),
            }),
            Self::Device { kind, detail, permission_denied: false } => Some(UserFacing {
                title: format!("{} unavailable", capitalize(kind.label())),
                body: format!(
                    "The {} could not be started ({detail}). Make sure it is \
                     connected and not in use by another application.",
                    kind.label()
                ),
            }),
            Self::CredentialRefresh(_) => None,
            Self::NotConnected { operation } => Some(UserFacing {
                title: "Not connected".to_string(),
                body: format!("Cannot {operation} while outside a room. Join a room first."),
            }),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
