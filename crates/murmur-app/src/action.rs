//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use murmur_core::Identity;

use crate::Theme;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Start a session under a display name.
    Join {
        /// Validated display name.
        identity: Identity,
    },

    /// End the session and forget the display name.
    Leave,

    /// Post the composer text.
    SendMessage {
        /// Text exactly as typed.
        text: String,
    },

    /// The composer was edited.
    Keystroke,

    /// The theme changed and should be persisted.
    ThemeChanged(Theme),
}
