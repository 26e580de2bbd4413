//! Combined session view.

use murmur_proto::ServerEvent;

use crate::{Identity, Reducer, Roster, Transcript, TypingSet};

/// The local view of a room: transcript, roster and typing level.
///
/// Owned by the connection manager and only advanced through
/// [`SyncState::apply`]. A fresh connection-handle always starts from
/// [`SyncState::default`]; nothing carries over across a rejoin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    transcript: Transcript,
    roster: Roster,
    typing: TypingSet,
}

impl SyncState {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one inbound event to its reducer.
    ///
    /// Each event touches exactly one projection; the other two are moved
    /// through untouched.
    #[must_use]
    pub fn apply(self, event: ServerEvent) -> Self {
        let Self { transcript, roster, typing } = self;
        match event {
            ServerEvent::Message(message) => {
                Self { transcript: transcript.reduce(message.into()), roster, typing }
            },
            ServerEvent::UserList(names) => {
                Self { transcript, roster: roster.reduce(reported(names)), typing }
            },
            ServerEvent::Typing(names) => {
                Self { transcript, roster, typing: typing.reduce(reported(names)) }
            },
        }
    }

    /// Messages received so far.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Last reported roster.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Last reported typing level.
    pub fn typing(&self) -> &TypingSet {
        &self.typing
    }

    /// Whether nothing has been received.
    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty() && self.roster.is_empty() && self.typing.is_empty()
    }
}

fn reported(names: Vec<String>) -> Vec<Identity> {
    names.into_iter().map(Identity::reported).collect()
}
