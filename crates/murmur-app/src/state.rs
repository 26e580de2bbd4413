//! Observable application state types.
//!
//! These are the view-model pieces the App owns itself. Everything about the
//! room (transcript, roster, typing) lives in the client's
//! [`SyncState`](murmur_core::SyncState) and reaches the renderer through
//! [`crate::View`].

use std::fmt;

/// Connection state as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No display name chosen; nothing is connected.
    #[default]
    Idle,
    /// Handle opened, waiting for the server.
    Connecting,
    /// Joined with a live link.
    Online,
    /// Joined, but the link dropped. The transport is retrying or gave up.
    Offline,
}

/// Colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Light background.
    #[default]
    Light,
    /// Dark background.
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Theme for a stored dark-mode flag.
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    /// Whether this is the dark theme.
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Dark => f.write_str("dark"),
        }
    }
}
