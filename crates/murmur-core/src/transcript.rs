//! Append-only message transcript.

use std::slice;

use crate::{Message, Reducer};

/// Messages in local arrival order.
///
/// Arrival order is the only order available: no sequence numbers are
/// exchanged, so this is neither causal nor wall-clock order. There is no
/// dedup and no size cap; a live session grows without bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Iterate over messages, oldest first.
    pub fn iter(&self) -> slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no message has arrived yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl Reducer for Transcript {
    type Event = Message;

    fn reduce(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
