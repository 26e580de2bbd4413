//! Read-only projection handed to the renderer.

use murmur_core::{Identity, Message, SyncState};

use crate::App;

/// Everything a frame needs, borrowed.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    /// UI state.
    pub app: &'a App,
    /// Synchronized room state.
    pub session: &'a SyncState,
    /// Current identity, `None` before joining.
    pub identity: Option<&'a Identity>,
}

impl<'a> View<'a> {
    /// Bundle the pieces of a frame.
    pub fn new(app: &'a App, session: &'a SyncState, identity: Option<&'a Identity>) -> Self {
        Self { app, session, identity }
    }

    /// Whether the message was sent under the current identity.
    pub fn is_own(&self, message: &Message) -> bool {
        self.identity.is_some_and(|identity| message.sender() == identity)
    }
}
