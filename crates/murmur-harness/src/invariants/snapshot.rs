//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use murmur_core::{HandleId, Message};

use crate::SimServer;

/// Snapshot of the entire system state.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-client state snapshots.
    pub clients: Vec<ClientSnapshot>,
    /// Room state. Set only when nothing is in flight, since clients lag
    /// the room until they have drained their events.
    pub room: Option<RoomSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no clients).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single client.
    pub fn single(client: ClientSnapshot) -> Self {
        Self { clients: vec![client], room: None }
    }

    /// Create a snapshot from multiple clients.
    pub fn from_clients(clients: Vec<ClientSnapshot>) -> Self {
        Self { clients, room: None }
    }

    /// Attach the quiescent room state.
    #[must_use]
    pub fn with_room(mut self, room: RoomSnapshot) -> Self {
        self.room = Some(room);
        self
    }

    /// Add a client snapshot.
    pub fn add_client(&mut self, client: ClientSnapshot) {
        self.clients.push(client);
    }
}

/// Snapshot of a single client's observable state.
#[derive(Debug, Clone, Default)]
pub struct ClientSnapshot {
    /// Client identifier within the test.
    pub id: u64,
    /// Chosen display name.
    pub identity: Option<String>,
    /// Live handle according to the connection manager.
    pub handle: Option<HandleId>,
    /// Handles the driver currently has open.
    pub open_handles: Vec<HandleId>,
    /// Session joined and link up.
    pub online: bool,
    /// Transcript contents.
    pub transcript: Vec<Message>,
    /// Roster names.
    pub roster: Vec<String>,
    /// Typing names.
    pub typing: Vec<String>,
    /// Transcript as rendered, per live handle, oldest first.
    pub transcript_history: Vec<(HandleId, Vec<Message>)>,
}

impl ClientSnapshot {
    /// Create a new client snapshot.
    pub fn new(id: u64) -> Self {
        Self { id, ..Default::default() }
    }

    /// Set identity and live handle.
    #[must_use]
    pub fn with_session(mut self, identity: impl Into<String>, handle: HandleId) -> Self {
        self.identity = Some(identity.into());
        self.handle = Some(handle);
        self
    }

    /// Set the driver's open handles.
    #[must_use]
    pub fn with_open_handles(mut self, handles: impl IntoIterator<Item = HandleId>) -> Self {
        self.open_handles = handles.into_iter().collect();
        self
    }

    /// Mark the session joined with a live link.
    #[must_use]
    pub fn online(mut self) -> Self {
        self.online = true;
        self
    }

    /// Set the transcript.
    #[must_use]
    pub fn with_transcript(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.transcript = messages.into_iter().collect();
        self
    }

    /// Set roster names.
    #[must_use]
    pub fn with_roster<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.roster = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set typing names.
    #[must_use]
    pub fn with_typing<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.typing = names.into_iter().map(Into::into).collect();
        self
    }

    /// Record a transcript observation for history tracking.
    pub fn record_transcript(&mut self, handle: HandleId, messages: Vec<Message>) {
        self.transcript_history.push((handle, messages));
    }
}

/// Snapshot of the reference room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomSnapshot {
    /// Joined names.
    pub users: Vec<String>,
}

impl RoomSnapshot {
    /// Capture a room.
    pub fn from_server(server: &SimServer) -> Self {
        Self { users: server.users().to_vec() }
    }
}
