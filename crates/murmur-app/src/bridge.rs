//! Session-to-Application translation layer.
//!
//! The [`Bridge`] wraps the [`murmur_client::Client`] connection manager and
//! adapts it to the application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts [`crate::AppAction`]s into [`ClientEvent`]s.
//! - Accumulates [`TransportCommand`]s for the driver to execute in the next
//!   I/O cycle, in the order the client produced them.
//! - Converts session notifications back into [`crate::AppEvent`]s.

use murmur_client::{Client, ClientAction, ClientEvent, TransportEvent};
use murmur_core::{HandleId, Identity, SyncState};
use murmur_proto::Intent;

use crate::{AppAction, AppEvent};

/// Transport work for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    /// Create a transport for a handle.
    Open(HandleId),
    /// Destroy the transport of a handle.
    Close(HandleId),
    /// Send an intent on a handle.
    Emit {
        /// Handle to send on.
        handle: HandleId,
        /// Outbound event.
        intent: Intent,
    },
}

/// Bridge between App and the connection manager.
#[derive(Debug, Default)]
pub struct Bridge {
    client: Client,
    outgoing: Vec<TransportCommand>,
}

impl Bridge {
    /// Create a bridge with no identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        let event = match action {
            AppAction::Join { identity } => ClientEvent::ChooseIdentity(identity),
            AppAction::Leave => ClientEvent::ClearIdentity,
            AppAction::SendMessage { text } => ClientEvent::SendMessage { text },
            AppAction::Keystroke => ClientEvent::Keystroke,
            AppAction::Render | AppAction::Quit | AppAction::ThemeChanged(_) => return vec![],
        };

        let actions = self.client.handle_event(event);
        self.process_client_actions(actions)
    }

    /// Handle an event from the transport of `handle`.
    pub fn handle_transport(&mut self, handle: HandleId, event: TransportEvent) -> Vec<AppEvent> {
        let actions = self.client.handle_event(ClientEvent::Transport { handle, event });
        self.process_client_actions(actions)
    }

    /// Tear the session down before exit.
    pub fn shutdown(&mut self) -> Vec<AppEvent> {
        let actions = self.client.handle_event(ClientEvent::Shutdown);
        self.process_client_actions(actions)
    }

    /// Take pending transport commands.
    pub fn take_outgoing(&mut self) -> Vec<TransportCommand> {
        std::mem::take(&mut self.outgoing)
    }

    /// The wrapped client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Synchronized view of the live session.
    pub fn state(&self) -> &SyncState {
        self.client.state()
    }

    /// Current identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.client.identity()
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::Open { handle } => {
                    self.outgoing.push(TransportCommand::Open(handle));
                },
                ClientAction::Close { handle } => {
                    self.outgoing.push(TransportCommand::Close(handle));
                },
                ClientAction::Emit { handle, intent } => {
                    self.outgoing.push(TransportCommand::Emit { handle, intent });
                },
                ClientAction::PhaseChanged(phase) => events.push(AppEvent::PhaseChanged(phase)),
                ClientAction::LinkChanged { up, .. } => events.push(AppEvent::LinkChanged { up }),
                ClientAction::SessionUpdated => events.push(AppEvent::SessionUpdated),
            }
        }

        events
    }
}
