//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: view state machine
//! - [`Bridge`]: session bridge to the room state machine
//! - [`Driver`]: platform-specific I/O

use gridcall_core::SessionConfig;

use crate::{App, AppAction, AppEvent, Bridge, Driver};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
pub struct Runtime<D>
where
    D: Driver,
{
    driver: D,
    app: App,
    bridge: Bridge<D::Instant>,
}

impl<D> Runtime<D>
where
    D: Driver,
{
    /// Create a new runtime with the given driver and configuration.
    pub fn new(driver: D, config: SessionConfig) -> Self {
        let app = App::new(config.clone());
        let bridge = Bridge::new(config);
        Self { driver, app, bridge }
    }

    /// Run the main event loop.
    ///
    /// This is the core orchestration loop that:
    /// 1. Polls for view input events from the driver
    /// 2. Receives SDK events and routes them through the bridge
    /// 3. Processes actions and events between App and Bridge
    /// 4. Executes outgoing SDK commands through the driver
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        loop {
            let should_quit = self.process_cycle().await?;
            if should_quit {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    pub async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        if let Some(event) = self.driver.poll_event().await? {
            let actions = self.app.handle(event);
            if !actions.is_empty() && self.process_actions(actions).await? {
                return Ok(true);
            }
        }

        if let Some(event) = self.driver.next_session_event().await {
            let now = self.driver.now();
            let events = self.bridge.handle_session_event(event, now);
            self.execute_outgoing().await?;
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        let now = self.driver.now();
        let events = self.bridge.handle_tick(now);
        self.execute_outgoing().await?;
        if self.process_bridge_events(events).await? {
            return Ok(true);
        }

        Ok(false)
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),

                    // Session operations go through the bridge
                    AppAction::Connect { .. }
                    | AppAction::Leave
                    | AppAction::PublishStream { .. }
                    | AppAction::ReplaceStream { .. }
                    | AppAction::RetractStream { .. }
                    | AppAction::SendChat { .. }
                    | AppAction::SetQuality { .. }
                    | AppAction::MarkChatRead
                    | AppAction::Invite { .. } => {
                        let now = self.driver.now();
                        let events = self.bridge.process_app_action(action, now);
                        for event in events {
                            let new_actions = self.app.handle(event);
                            pending_actions.extend(new_actions);
                        }
                        self.execute_outgoing().await?;
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Execute all pending outgoing SDK commands.
    async fn execute_outgoing(&mut self) -> Result<(), D::Error> {
        let commands = self.bridge.take_outgoing();
        for command in commands {
            self.driver.execute(command).await?;
        }
        Ok(())
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Get a reference to the Bridge
    pub fn bridge(&self) -> &Bridge<D::Instant> {
        &self.bridge
    }
}
