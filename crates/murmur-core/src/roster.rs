//! Connected participants.

use std::slice;

use crate::{Identity, Reducer};

/// Participants the server currently reports as connected, in server order.
///
/// Each update replaces the whole roster. A participant leaving shows up as a
/// new, shorter list; the client never removes members on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: Vec<Identity>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Members in server order.
    pub fn members(&self) -> &[Identity] {
        &self.members
    }

    /// Iterate over members.
    pub fn iter(&self) -> slice::Iter<'_, Identity> {
        self.members.iter()
    }

    /// Whether `name` is listed.
    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether nobody is listed.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Reducer for Roster {
    type Event = Vec<Identity>;

    fn reduce(self, members: Vec<Identity>) -> Self {
        Self { members }
    }
}
