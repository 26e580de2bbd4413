//! Client events and actions.

use murmur_core::{HandleId, Identity};
use murmur_proto::{Intent, ServerEvent};

/// Notifications a transport reports for one connection-handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The link is open and the server accepted the namespace connect.
    ///
    /// Reported again after every successful reconnect.
    Connected,

    /// The link dropped. The transport is retrying.
    Disconnected {
        /// Why the link dropped.
        reason: String,
    },

    /// An inbound chat event, in server order.
    Received(ServerEvent),

    /// The transport exhausted its retries and stopped.
    Failed {
        /// Last error seen.
        reason: String,
    },
}

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Forwarding user intents (choose a name, send, type)
/// - Tagging transport notifications with the handle they came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The user chose a display name.
    ///
    /// Replaces the current session when the name differs.
    ChooseIdentity(Identity),

    /// The user cleared their display name.
    ClearIdentity,

    /// The user submitted the composer.
    SendMessage {
        /// Raw composer text, sent verbatim.
        text: String,
    },

    /// The user edited the composer.
    Keystroke,

    /// A transport reported something about one handle.
    Transport {
        /// Handle the notification came from.
        handle: HandleId,
        /// What happened.
        event: TransportEvent,
    },

    /// The session is ending.
    Shutdown,
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No identity, no handle.
    #[default]
    NoIdentity,
    /// Handle opened, join requested, link not confirmed yet.
    Connecting,
    /// Link confirmed; inbound events reach the reducers.
    Joined,
}

/// Actions the client produces for the caller to execute.
///
/// Order matters: a `Close` for the previous handle is always returned
/// before the `Open` of its replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Create a transport for a new handle.
    Open {
        /// Handle to create.
        handle: HandleId,
    },

    /// Destroy the transport of a handle.
    Close {
        /// Handle to destroy.
        handle: HandleId,
    },

    /// Send an intent on a handle.
    Emit {
        /// Handle to send on.
        handle: HandleId,
        /// Outbound event.
        intent: Intent,
    },

    /// The session moved to a new phase.
    PhaseChanged(SessionPhase),

    /// The link beneath the live handle went up or down.
    LinkChanged {
        /// Live handle.
        handle: HandleId,
        /// Whether the link is now up.
        up: bool,
    },

    /// The synchronized view changed and should be re-rendered.
    SessionUpdated,
}
