//! Typing level.

use std::slice;

use crate::{Identity, Reducer};

/// Participants the server last reported as composing a message.
///
/// This is a level, not an edge: the set only changes when the server sends
/// a new one. Nobody is dropped locally on a timeout, and the local user's
/// own entry disappears only once the server says so.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypingSet {
    typists: Vec<Identity>,
}

impl TypingSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Typists in server order.
    pub fn typists(&self) -> &[Identity] {
        &self.typists
    }

    /// Iterate over typists.
    pub fn iter(&self) -> slice::Iter<'_, Identity> {
        self.typists.iter()
    }

    /// Whether `name` is typing.
    pub fn contains(&self, name: &str) -> bool {
        self.typists.iter().any(|typist| typist == name)
    }

    /// Number of typists.
    pub fn len(&self) -> usize {
        self.typists.len()
    }

    /// Whether nobody is typing.
    pub fn is_empty(&self) -> bool {
        self.typists.is_empty()
    }
}

impl Reducer for TypingSet {
    type Event = Vec<Identity>;

    fn reduce(self, typists: Vec<Identity>) -> Self {
        Self { typists }
    }
}
