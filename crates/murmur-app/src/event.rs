//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize) and system ticks.
//! - Session notifications translated from the underlying client.

use murmur_client::SessionPhase;

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Session moved to a new phase.
    PhaseChanged(SessionPhase),

    /// Link beneath the session went up or down.
    LinkChanged {
        /// Whether the link is now up.
        up: bool,
    },

    /// Transcript, roster or typing level changed.
    SessionUpdated,

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
