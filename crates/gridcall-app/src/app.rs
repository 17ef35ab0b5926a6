//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the visible
//! state of the conference view completely decoupled from I/O and the media
//! SDK.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Holds the latest session snapshot and derives the visible tile pages.
//! - Tracks viewport geometry and recomputes page capacity on resize.
//! - Tracks the chat panel, whose opening clears the unread counter.
//! - Queues user-visible notifications.

use std::{collections::VecDeque, sync::Arc};

use gridcall_core::{SessionConfig, UserFacing};
use gridcall_layout::{CapacityEstimator, Dimensions, LayoutSolution, Paginator, solve};
use gridcall_session::{Notification, ParticipantId, SessionSnapshot};

use crate::{AppAction, AppEvent, UserCommand};

/// Notifications kept before the oldest is dropped.
const MAX_NOTIFICATIONS: usize = 8;

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Layout and timing configuration for this session.
    config: SessionConfig,
    /// Latest immutable session snapshot.
    snapshot: Arc<SessionSnapshot>,
    /// Viewport dimensions in pixels.
    viewport: Dimensions,
    /// Tiles-per-page estimation from viewport and measured tile size.
    capacity: CapacityEstimator,
    /// Page state over the activity order.
    paginator: Paginator,
    /// Whether the chat panel is open.
    chat_open: bool,
    /// Recent notifications, newest last.
    notifications: VecDeque<Notification>,
    /// Dismissible error dialog, shown until the user dismisses it.
    error_dialog: Option<UserFacing>,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create a new App with the given session configuration.
    pub fn new(config: SessionConfig) -> Self {
        let viewport = Dimensions::new(1280.0, 720.0);
        let mut capacity = CapacityEstimator::new(&config);
        let paginator = Paginator::new(capacity.estimate(viewport));
        Self {
            config,
            snapshot: Arc::new(SessionSnapshot::default()),
            viewport,
            capacity,
            paginator,
            chat_open: false,
            notifications: VecDeque::new(),
            error_dialog: None,
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Resize { width, height } => {
                self.viewport = Dimensions::new(width, height);
                self.refresh_capacity();
                vec![AppAction::Render]
            },
            AppEvent::TileMeasured { width, height } => {
                self.capacity.record_tile(Dimensions::new(width, height));
                self.refresh_capacity();
                vec![AppAction::Render]
            },
            AppEvent::Command(command) => self.handle_command(command),
            AppEvent::SnapshotUpdated(snapshot) => {
                self.snapshot = snapshot;
                self.paginator.set_len(self.snapshot.activity_order.len());
                vec![AppAction::Render]
            },
            AppEvent::Notified(notification) => {
                if self.notifications.len() == MAX_NOTIFICATIONS {
                    self.notifications.pop_front();
                }
                self.notifications.push_back(notification);
                vec![AppAction::Render]
            },
            AppEvent::DeviceFailed(error) => {
                match error.user_facing() {
                    Some(facing) => self.error_dialog = Some(facing),
                    // Silent failures (credential refresh) never reach a
                    // dialog
                    None => tracing::debug!(%error, "suppressed silent failure"),
                }
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    fn handle_command(&mut self, command: UserCommand) -> Vec<AppAction> {
        match command {
            UserCommand::Connect { room_id, token } => {
                self.status_message = Some(format!("Joining {room_id}..."));
                vec![AppAction::Connect { room_id, token }, AppAction::Render]
            },
            UserCommand::Leave => vec![AppAction::Leave, AppAction::Render],
            UserCommand::SendChat { payload } => {
                vec![AppAction::SendChat { payload }, AppAction::Render]
            },
            UserCommand::OpenChat => {
                self.chat_open = true;
                vec![AppAction::MarkChatRead, AppAction::Render]
            },
            UserCommand::CloseChat => {
                self.chat_open = false;
                vec![AppAction::Render]
            },
            UserCommand::NextPage => {
                self.paginator.next_page();
                vec![AppAction::Render]
            },
            UserCommand::PreviousPage => {
                self.paginator.previous_page();
                vec![AppAction::Render]
            },
            UserCommand::SetQuality { participant, key, quality } => {
                vec![AppAction::SetQuality { participant, key, quality }, AppAction::Render]
            },
            UserCommand::Invite { target } => {
                self.status_message = Some(format!("Dialing {target}..."));
                vec![AppAction::Invite { target }, AppAction::Render]
            },
            UserCommand::PublishStream { key, tracks } => {
                vec![AppAction::PublishStream { key, tracks }, AppAction::Render]
            },
            UserCommand::ReplaceStream { key, tracks } => {
                vec![AppAction::ReplaceStream { key, tracks }, AppAction::Render]
            },
            UserCommand::RetractStream { key } => {
                vec![AppAction::RetractStream { key }, AppAction::Render]
            },
            UserCommand::DismissError => {
                self.error_dialog = None;
                vec![AppAction::Render]
            },
            UserCommand::Quit => vec![AppAction::Quit],
        }
    }

    /// Recompute the page capacity after a geometry change.
    fn refresh_capacity(&mut self) {
        let capacity = self.capacity.estimate(self.viewport);
        self.paginator.set_capacity(capacity);
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Latest session snapshot.
    pub fn snapshot(&self) -> &Arc<SessionSnapshot> {
        &self.snapshot
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Viewport dimensions.
    pub fn viewport(&self) -> Dimensions {
        self.viewport
    }

    /// Whether the chat panel is open.
    pub fn chat_open(&self) -> bool {
        self.chat_open
    }

    /// Page state over the tile order.
    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Pending notifications, newest last.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Dismiss the oldest notification.
    pub fn dismiss_notification(&mut self) -> Option<Notification> {
        self.notifications.pop_front()
    }

    /// Current error dialog, if one is showing.
    pub fn error_dialog(&self) -> Option<&UserFacing> {
        self.error_dialog.as_ref()
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Participant ids visible on the current page, in render order.
    pub fn visible_tiles(&self) -> Vec<ParticipantId> {
        self.paginator.page_slice(&self.snapshot.activity_order).to_vec()
    }

    /// Grid layout for the current page. `None` when there is nothing to
    /// show or the viewport has no usable area.
    pub fn layout(&self) -> Option<LayoutSolution> {
        let items = self.paginator.page_range().len();
        if items == 0 {
            return None;
        }

        let grid_height = self.viewport.height - self.config.chrome_height;
        if grid_height <= 0.0 || self.viewport.width <= 0.0 {
            return None;
        }

        Some(solve(
            Dimensions::new(self.viewport.width, grid_height),
            self.config.tile_aspect,
            items,
            self.config.max_rows,
            self.config.tile_gap,
        ))
    }
}

#[cfg(test)]
mod tests {
    use gridcall_session::{ConnectionStatus, StreamKey, SubscriptionQuality};

    use super::*;

    fn snapshot_with_order(ids: &[&str]) -> Arc<SessionSnapshot> {
        Arc::new(SessionSnapshot {
            status: ConnectionStatus::Connected,
            activity_order: ids.iter().map(|id| ParticipantId::from(*id)).collect(),
            ..SessionSnapshot::default()
        })
    }

    #[test]
    fn snapshot_update_repaginates() {
        let mut app = App::new(SessionConfig::default());
        let _ = app.handle(AppEvent::Resize { width: 800.0, height: 530.0 });
        let _ = app.handle(AppEvent::TileMeasured { width: 400.0, height: 225.0 });
        // Usable 800x450 / tile 400x225 = 4 per page

        let _ = app.handle(AppEvent::SnapshotUpdated(snapshot_with_order(&[
            "me", "a", "b", "c", "d", "e",
        ])));

        assert_eq!(app.paginator().page_count(), 2);
        assert_eq!(app.visible_tiles().len(), 4);
        assert_eq!(app.visible_tiles()[0], ParticipantId::from("me"));
    }

    #[test]
    fn page_navigation_slices_tiles() {
        let mut app = App::new(SessionConfig::default());
        let _ = app.handle(AppEvent::Resize { width: 800.0, height: 530.0 });
        let _ = app.handle(AppEvent::TileMeasured { width: 400.0, height: 225.0 });
        let _ = app.handle(AppEvent::SnapshotUpdated(snapshot_with_order(&[
            "me", "a", "b", "c", "d", "e",
        ])));

        let _ = app.handle(AppEvent::Command(UserCommand::NextPage));
        assert_eq!(app.visible_tiles(), vec![ParticipantId::from("d"), ParticipantId::from("e")]);

        // No wrap past the last page
        let _ = app.handle(AppEvent::Command(UserCommand::NextPage));
        assert_eq!(app.paginator().page(), 2);
    }

    #[test]
    fn open_chat_requests_unread_clear() {
        let mut app = App::new(SessionConfig::default());
        let actions = app.handle(AppEvent::Command(UserCommand::OpenChat));

        assert!(app.chat_open());
        assert!(matches!(actions.as_slice(), [AppAction::MarkChatRead, AppAction::Render]));
    }

    #[test]
    fn layout_uses_page_item_count() {
        let mut app = App::new(SessionConfig::default());
        let _ = app.handle(AppEvent::Resize { width: 1280.0, height: 800.0 });
        let _ = app.handle(AppEvent::SnapshotUpdated(snapshot_with_order(&["me", "a", "b"])));

        let solution = app.layout();
        assert!(solution.is_some_and(|s| s.rows * s.cols >= 3));
    }

    #[test]
    fn layout_is_none_with_no_tiles() {
        let app = App::new(SessionConfig::default());
        assert!(app.layout().is_none());
    }

    #[test]
    fn notifications_are_bounded() {
        let mut app = App::new(SessionConfig::default());
        for n in 0..20 {
            let _ = app.handle(AppEvent::Notified(Notification::ParticipantJoined {
                name: format!("p{n}"),
            }));
        }

        assert_eq!(app.notifications().count(), MAX_NOTIFICATIONS);
        // Oldest dropped first
        assert!(matches!(
            app.dismiss_notification(),
            Some(Notification::ParticipantJoined { name }) if name == "p12"
        ));
    }

    #[test]
    fn device_failure_shows_dismissible_dialog() {
        let mut app = App::new(SessionConfig::default());
        let error = gridcall_core::SessionError::Device {
            kind: gridcall_core::DeviceKind::Camera,
            detail: "not found".to_string(),
            permission_denied: false,
        };

        let _ = app.handle(AppEvent::DeviceFailed(error));
        assert!(app.error_dialog().is_some_and(|d| d.title.contains("Camera")));

        let _ = app.handle(AppEvent::Command(UserCommand::DismissError));
        assert!(app.error_dialog().is_none());
    }

    #[test]
    fn silent_failures_never_open_a_dialog() {
        let mut app = App::new(SessionConfig::default());
        let _ = app.handle(AppEvent::DeviceFailed(gridcall_core::SessionError::CredentialRefresh(
            "503".to_string(),
        )));

        assert!(app.error_dialog().is_none());
    }

    #[test]
    fn quality_command_passes_through() {
        let mut app = App::new(SessionConfig::default());
        let actions = app.handle(AppEvent::Command(UserCommand::SetQuality {
            participant: ParticipantId::from("a"),
            key: StreamKey::Main,
            quality: SubscriptionQuality::Low,
        }));

        assert!(matches!(actions.as_slice(), [AppAction::SetQuality { .. }, AppAction::Render]));
    }
}
