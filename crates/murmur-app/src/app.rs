//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the application completely decoupled from I/O and session
//! mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Owns the composer line and turns keys into edits, commands and messages.
//! - Tracks the theme and the connection state shown in the status bar.
//! - Stores terminal dimensions to handle resize events.

use murmur_client::SessionPhase;
use murmur_core::Identity;

use crate::{AppAction, AppEvent, Command, ConnectionState, InputState, KeyInput, Theme};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Connection state shown to the user.
    connection: ConnectionState,
    /// Server label for the status bar.
    server: String,
    /// Color theme.
    theme: Theme,
    /// Composer line.
    input: InputState,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create a new App showing the given server label.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            connection: ConnectionState::Idle,
            server: server.into(),
            theme: Theme::default(),
            input: InputState::new(),
            terminal_size: (80, 24),
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.keystroke(key),
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::PhaseChanged(phase) => {
                self.connection = match phase {
                    SessionPhase::NoIdentity => ConnectionState::Idle,
                    SessionPhase::Connecting => ConnectionState::Connecting,
                    SessionPhase::Joined => ConnectionState::Online,
                };
                vec![AppAction::Render]
            },
            AppEvent::LinkChanged { up } => {
                // A link flap during Connecting is not yet a join
                self.connection = match (self.connection, up) {
                    (ConnectionState::Idle, _) => ConnectionState::Idle,
                    (ConnectionState::Connecting, true) => ConnectionState::Connecting,
                    (_, true) => ConnectionState::Online,
                    (_, false) => ConnectionState::Offline,
                };
                vec![AppAction::Render]
            },
            AppEvent::SessionUpdated => vec![AppAction::Render],
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Apply one key to the composer.
    ///
    /// Every edit of the line is reported as [`AppAction::Keystroke`], so the
    /// room sees a typing indicator. Cursor movement is not an edit.
    pub fn keystroke(&mut self, key: KeyInput) -> Vec<AppAction> {
        let edited = match key {
            KeyInput::Char(c) => {
                self.input.insert(c);
                true
            },
            KeyInput::Backspace => self.input.backspace(),
            KeyInput::Delete => self.input.delete(),
            KeyInput::Left => {
                self.input.left();
                false
            },
            KeyInput::Right => {
                self.input.right();
                false
            },
            KeyInput::Home => {
                self.input.home();
                false
            },
            KeyInput::End => {
                self.input.end();
                false
            },
            KeyInput::Enter => return self.submit(),
            KeyInput::Esc => return self.quit(),
            KeyInput::Tab | KeyInput::Up | KeyInput::Down => return vec![],
        };

        if edited { vec![AppAction::Keystroke, AppAction::Render] } else { vec![AppAction::Render] }
    }

    /// Submit the composer line.
    ///
    /// Before joining, a plain line is taken as the display name.
    fn submit(&mut self) -> Vec<AppAction> {
        let line = self.input.take();
        if line.is_empty() {
            return vec![];
        }

        let actions = match Command::parse(&line) {
            Command::Nick { name } => self.join(&name),
            Command::Leave => self.leave(),
            Command::Theme => self.toggle_theme(),
            Command::Quit => self.quit(),
            Command::Message { text } if self.connection == ConnectionState::Idle => {
                self.join(&text)
            },
            Command::Message { text } => self.send_message(text),
            Command::Unknown { input } => {
                self.status_message = Some(format!("Unknown command: /{input}"));
                vec![]
            },
            Command::InvalidArgs { command, usage } => {
                self.status_message = Some(format!("/{command}: usage {usage}"));
                vec![]
            },
        };

        // The composer was cleared either way
        if actions.is_empty() { vec![AppAction::Render] } else { actions }
    }

    /// Start (or restart) the session under a display name.
    ///
    /// Surrounding whitespace is trimmed; a blank name is silently ignored.
    pub fn join(&mut self, raw_name: &str) -> Vec<AppAction> {
        let Ok(identity) = Identity::new(raw_name) else {
            return vec![];
        };

        self.status_message = Some(format!("Joining as {identity}"));
        vec![AppAction::Join { identity }, AppAction::Render]
    }

    /// End the session and forget the display name.
    pub fn leave(&mut self) -> Vec<AppAction> {
        if self.connection == ConnectionState::Idle {
            self.status_message = Some("Not in the room".to_string());
            return vec![AppAction::Render];
        }

        self.status_message = None;
        vec![AppAction::Leave, AppAction::Render]
    }

    /// Post a message. The text is passed on exactly as typed.
    pub fn send_message(&mut self, text: impl Into<String>) -> Vec<AppAction> {
        vec![AppAction::SendMessage { text: text.into() }, AppAction::Render]
    }

    /// Switch between light and dark.
    pub fn toggle_theme(&mut self) -> Vec<AppAction> {
        self.theme = self.theme.toggled();
        vec![AppAction::ThemeChanged(self.theme), AppAction::Render]
    }

    /// Set the theme without emitting a change (used when restoring).
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Quit the application.
    pub fn quit(&mut self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    /// Server label.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Color theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Composer line.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Terminal dimensions.
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Status message, if any.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_line(app: &mut App, line: &str) -> Vec<AppAction> {
        line.chars().for_each(|c| {
            app.handle(AppEvent::Key(KeyInput::Char(c)));
        });
        app.handle(AppEvent::Key(KeyInput::Enter))
    }

    fn joined(app: &mut App) {
        app.handle(AppEvent::PhaseChanged(SessionPhase::Connecting));
        app.handle(AppEvent::PhaseChanged(SessionPhase::Joined));
    }

    #[test]
    fn blank_name_is_ignored() {
        let mut app = App::new("local");
        assert!(app.join("   ").is_empty());
        assert_eq!(type_line(&mut app, "  "), vec![AppAction::Render]);
    }

    #[test]
    fn first_line_joins() {
        let mut app = App::new("local");
        let actions = type_line(&mut app, " alice ");

        let Some(AppAction::Join { identity }) = actions.first() else {
            panic!("expected join, got {actions:?}");
        };
        assert_eq!(identity, "alice");
        assert!(app.input().is_empty());
    }

    #[test]
    fn lines_become_messages_once_joined() {
        let mut app = App::new("local");
        joined(&mut app);

        let actions = type_line(&mut app, " hi ");
        assert_eq!(actions[0], AppAction::SendMessage { text: " hi ".into() });
    }

    #[test]
    fn edits_are_keystrokes_but_movement_is_not() {
        let mut app = App::new("local");
        assert_eq!(
            app.handle(AppEvent::Key(KeyInput::Char('a'))),
            vec![AppAction::Keystroke, AppAction::Render]
        );
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Left)), vec![AppAction::Render]);
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Backspace)), vec![AppAction::Render]);
        assert_eq!(
            app.handle(AppEvent::Key(KeyInput::Delete)),
            vec![AppAction::Keystroke, AppAction::Render]
        );
    }

    #[test]
    fn commands() {
        let mut app = App::new("local");
        joined(&mut app);

        assert_eq!(type_line(&mut app, "/theme")[0], AppAction::ThemeChanged(Theme::Dark));
        assert_eq!(app.theme(), Theme::Dark);

        assert_eq!(type_line(&mut app, "/leave")[0], AppAction::Leave);
        assert_eq!(type_line(&mut app, "/quit"), vec![AppAction::Quit]);

        type_line(&mut app, "/shrug");
        assert_eq!(app.status_message(), Some("Unknown command: /shrug"));
    }

    #[test]
    fn link_state_follows_phase() {
        let mut app = App::new("local");
        app.handle(AppEvent::LinkChanged { up: true });
        assert_eq!(app.connection_state(), ConnectionState::Idle);

        app.handle(AppEvent::PhaseChanged(SessionPhase::Connecting));
        app.handle(AppEvent::LinkChanged { up: true });
        assert_eq!(app.connection_state(), ConnectionState::Connecting);

        app.handle(AppEvent::PhaseChanged(SessionPhase::Joined));
        app.handle(AppEvent::LinkChanged { up: false });
        assert_eq!(app.connection_state(), ConnectionState::Offline);

        app.handle(AppEvent::LinkChanged { up: true });
        assert_eq!(app.connection_state(), ConnectionState::Online);

        app.handle(AppEvent::PhaseChanged(SessionPhase::NoIdentity));
        assert_eq!(app.connection_state(), ConnectionState::Idle);
    }
}
