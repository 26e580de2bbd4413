//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Session bridge to the connection manager
//! - [`Driver`]: Platform-specific I/O
//! - [`PreferenceStore`]: Persisted display name and theme

use tracing::{info, warn};

use crate::{
    App, AppAction, AppEvent, Bridge, Driver, PreferenceStore, Preferences, Theme,
    TransportCommand, View,
};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `S`: Preference storage
pub struct Runtime<D, S>
where
    D: Driver,
    S: PreferenceStore,
{
    driver: D,
    store: S,
    app: App,
    bridge: Bridge,
    preferences: Preferences,
    initial_name: Option<String>,
}

impl<D, S> Runtime<D, S>
where
    D: Driver,
    S: PreferenceStore,
{
    /// Create a new runtime. `server` is only used as a status label.
    pub fn new(driver: D, store: S, server: impl Into<String>) -> Self {
        Self {
            driver,
            store,
            app: App::new(server),
            bridge: Bridge::new(),
            preferences: Preferences::default(),
            initial_name: None,
        }
    }

    /// Join under this name at start, instead of the stored one.
    #[must_use]
    pub fn with_initial_name(mut self, name: impl Into<String>) -> Self {
        self.initial_name = Some(name.into());
        self
    }

    /// Run the main event loop until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.start().await?;

        loop {
            if self.step().await? {
                break;
            }
        }

        self.shutdown().await
    }

    /// Restore preferences and join with the initial or stored name.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn start(&mut self) -> Result<(), D::Error> {
        match self.store.load() {
            Ok(preferences) => self.preferences = preferences,
            Err(err) => {
                warn!(error = %err, "failed to load preferences");
                self.app.set_status(format!("Could not load preferences: {err}"));
            },
        }
        self.app.set_theme(Theme::from_dark_mode(self.preferences.dark_mode));

        let name = self.initial_name.take().or_else(|| self.preferences.display_name.clone());
        let mut actions = match name {
            Some(name) => self.app.join(&name),
            None => vec![],
        };
        if actions.is_empty() {
            actions.push(AppAction::Render);
        }

        self.process_actions(actions).await?;
        Ok(())
    }

    /// Process one cycle of the event loop: one input event, then every
    /// transport event that is ready.
    ///
    /// Returns `true` if the application should quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        if let Some(event) = self.driver.poll_event().await? {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }

        while let Some((handle, event)) = self.driver.recv_transport() {
            let events = self.bridge.handle_transport(handle, event);
            self.flush_outgoing().await?;
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Tear the session down and stop the driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn shutdown(&mut self) -> Result<(), D::Error> {
        info!("shutting down");
        // Quitting is not leaving: the stored name survives for next start
        let _ = self.bridge.shutdown();
        self.flush_outgoing().await?;
        self.driver.stop();
        Ok(())
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
                    AppAction::Render => self.render()?,
                    AppAction::Quit => return Ok(true),
                    AppAction::ThemeChanged(theme) => {
                        self.preferences.dark_mode = theme.is_dark();
                        self.persist();
                    },

                    // Session operations go through the bridge
                    AppAction::Join { .. }
                    | AppAction::Leave
                    | AppAction::SendMessage { .. }
                    | AppAction::Keystroke => {
                        self.remember(&action);
                        let events = self.bridge.process_app_action(action);
                        self.flush_outgoing().await?;
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
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

    /// Keep the stored display name in step with joins and leaves.
    fn remember(&mut self, action: &AppAction) {
        let display_name = match action {
            AppAction::Join { identity } => Some(identity.as_str().to_owned()),
            AppAction::Leave => None,
            _ => return,
        };
        if self.preferences.display_name != display_name {
            self.preferences.display_name = display_name;
            self.persist();
        }
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.preferences) {
            warn!(error = %err, "failed to save preferences");
            self.app.set_status(format!("Could not save preferences: {err}"));
        }
    }

    /// Execute pending transport commands, in order.
    async fn flush_outgoing(&mut self) -> Result<(), D::Error> {
        for command in self.bridge.take_outgoing() {
            match command {
                TransportCommand::Open(handle) => self.driver.open(handle)?,
                TransportCommand::Close(handle) => self.driver.close(handle),
                TransportCommand::Emit { handle, intent } => {
                    self.driver.emit(handle, intent).await?;
                },
            }
        }
        Ok(())
    }

    fn render(&mut self) -> Result<(), D::Error> {
        let view = View::new(&self.app, self.bridge.state(), self.bridge.identity());
        self.driver.render(&view)
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the Bridge
    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
