//! Session-scoped configuration.
//!
//! One [`SessionConfig`] is constructed per room session and passed by
//! reference into the state machines and layout components. Its lifetime is
//! tied to the session: construction at join, teardown at leave. Nothing in
//! gridcall reads configuration from process-wide state.

use std::time::Duration;

/// Lifetime of a client credential issued by the token endpoint.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(50);

/// How long before credential expiry a refresh is requested.
pub const DEFAULT_TOKEN_REFRESH_LEAD: Duration = Duration::from_secs(20);

/// How long after the last audio-activity event the dominant speaker expires.
pub const DEFAULT_SPEAKER_EXPIRY: Duration = Duration::from_secs(5);

/// How long an invited participant has to join before the invite times out.
pub const DEFAULT_JOIN_ACK_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for one room session.
///
/// Timing fields feed the session state machine; tile and chrome dimensions
/// feed the layout capacity estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Display name published in the local participant's context.
    pub display_name: String,
    /// Preferred microphone device ID. `None` selects the system default.
    pub microphone_id: Option<String>,
    /// Preferred camera device ID. `None` selects the system default.
    pub camera_id: Option<String>,
    /// Credential lifetime granted by the token endpoint.
    pub token_ttl: Duration,
    /// Lead time before expiry at which a refresh is requested.
    pub token_refresh_lead: Duration,
    /// Dominant-speaker expiry window.
    pub speaker_expiry: Duration,
    /// Invite join-acknowledgement timeout.
    pub join_ack_timeout: Duration,
    /// Height reserved for navigation and report controls, in pixels.
    pub chrome_height: f64,
    /// Minimum tile width assumed before any tile has been measured.
    pub min_tile_width: f64,
    /// Minimum tile height assumed before any tile has been measured.
    pub min_tile_height: f64,
    /// Target width/height ratio for video tiles.
    pub tile_aspect: f64,
    /// Maximum number of tile rows the grid may use.
    pub max_rows: usize,
    /// Minimum gap between tiles, in pixels.
    pub tile_gap: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            microphone_id: None,
            camera_id: None,
            token_ttl: DEFAULT_TOKEN_TTL,
            token_refresh_lead: DEFAULT_TOKEN_REFRESH_LEAD,
            speaker_expiry: DEFAULT_SPEAKER_EXPIRY,
            join_ack_timeout: DEFAULT_JOIN_ACK_TIMEOUT,
            chrome_height: 80.0,
            min_tile_width: 160.0,
            min_tile_height: 90.0,
            tile_aspect: 16.0 / 9.0,
            max_rows: 4,
            tile_gap: 8.0,
        }
    }
}

impl SessionConfig {
    /// Interval between credential refresh requests (`ttl - lead`).
    ///
    /// Falls back to the full TTL if the lead exceeds it, so a misconfigured
    /// session still refreshes rather than spinning.
    #[must_use]
    pub fn token_refresh_interval(&self) -> Duration {
        self.token_ttl.checked_sub(self.token_refresh_lead).unwrap_or(self.token_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_refresh_interval_is_thirty_seconds() {
        let config = SessionConfig::default();
        assert_eq!(config.token_refresh_interval(), Duration::from_secs(30));
    }

    #[test]
    fn oversized_lead_falls_back_to_ttl() {
        let config = SessionConfig {
            token_ttl: Duration::from_secs(10),
            token_refresh_lead: Duration::from_secs(20),
            ..SessionConfig::default()
        };
        assert_eq!(config.token_refresh_interval(), Duration::from_secs(10));
    }
}
