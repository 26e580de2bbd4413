//! Transcript entries.

use murmur_proto::ChatMessage;

use crate::Identity;

/// One message as it arrived from the server.
///
/// Immutable: fields are only readable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    sender: Identity,
    text: String,
    timestamp: String,
}

impl Message {
    /// Create a message.
    pub fn new(sender: Identity, text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self { sender, text: text.into(), timestamp: timestamp.into() }
    }

    /// Who sent it, as asserted by the sender.
    pub fn sender(&self) -> &Identity {
        &self.sender
    }

    /// Message body.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Server timestamp, opaque to the client.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

impl From<ChatMessage> for Message {
    fn from(message: ChatMessage) -> Self {
        Self::new(Identity::reported(message.name), message.text, message.time)
    }
}
