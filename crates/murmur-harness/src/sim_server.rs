//! Reference model of the chat room server.
//!
//! `SimServer` holds the authoritative room state and fans events out to
//! per-connection outboxes. It is driven directly by tests and by the offline
//! terminal client; nothing here does I/O.
//!
//! Rules:
//! - `join` adds the name (once) and broadcasts `user_list`, then a `Server`
//!   notice that the name joined.
//! - `message` is broadcast to every connection, the sender included, stamped
//!   `HH:MM:SS` by the room's [`Clock`].
//! - `typing` adds the name to the typing level, `stop_typing` removes it;
//!   both broadcast the new level.
//! - A disconnect removes that connection's name from the roster and the
//!   typing level (unless another connection still uses it) and broadcasts
//!   both.

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex},
};

use chrono::{Local, NaiveTime, TimeDelta};
use murmur_proto::{ChatMessage, Intent, ServerEvent};
use tracing::debug;

/// Server-side connection identifier.
pub type ConnectionId = u64;

/// Sender name on room notices.
const SERVER_NAME: &str = "Server";

/// Time source for message stamps.
pub trait Clock: Send {
    /// Current time of day.
    fn now(&mut self) -> NaiveTime;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> NaiveTime {
        Local::now().time()
    }
}

/// Deterministic clock that moves forward a fixed step on every reading.
#[derive(Debug, Clone, Copy)]
pub struct SteppingClock {
    next: NaiveTime,
    step: TimeDelta,
}

impl SteppingClock {
    /// Start at `start`, advancing `step` per reading.
    pub fn new(start: NaiveTime, step: TimeDelta) -> Self {
        Self { next: start, step }
    }
}

impl Default for SteppingClock {
    /// Midnight, one second per reading.
    fn default() -> Self {
        Self::new(NaiveTime::MIN, TimeDelta::seconds(1))
    }
}

impl Clock for SteppingClock {
    fn now(&mut self) -> NaiveTime {
        let now = self.next;
        self.next = now + self.step;
        now
    }
}

#[derive(Debug, Default)]
struct Connection {
    username: Option<String>,
    outbox: VecDeque<ServerEvent>,
}

/// In-memory chat room.
pub struct SimServer {
    connections: BTreeMap<ConnectionId, Connection>,
    next_connection: ConnectionId,
    users: Vec<String>,
    typing: Vec<String>,
    clock: Box<dyn Clock>,
}

impl Default for SimServer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimServer {
    /// Empty room with a [`SteppingClock`].
    pub fn new() -> Self {
        Self::with_clock(SteppingClock::default())
    }

    /// Empty room stamping messages with `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            connections: BTreeMap::new(),
            next_connection: 1,
            users: Vec::new(),
            typing: Vec::new(),
            clock: Box::new(clock),
        }
    }

    /// Accept a connection.
    pub fn connect(&mut self) -> ConnectionId {
        let id = self.next_connection;
        self.next_connection += 1;
        self.connections.insert(id, Connection::default());
        debug!(connection = id, "connected");
        id
    }

    /// Drop a connection and release its name.
    pub fn disconnect(&mut self, id: ConnectionId) {
        let Some(connection) = self.connections.remove(&id) else {
            return;
        };
        debug!(connection = id, user = ?connection.username, "disconnected");

        if let Some(name) = connection.username {
            self.release(&name);
        }
        self.broadcast(ServerEvent::UserList(self.users.clone()));
        self.broadcast(ServerEvent::Typing(self.typing.clone()));
    }

    /// Process an intent from a connection.
    pub fn handle(&mut self, id: ConnectionId, intent: Intent) {
        if !self.connections.contains_key(&id) {
            debug!(connection = id, event = intent.name(), "event from unknown connection");
            return;
        }

        match intent {
            Intent::Join { username } => self.join(id, username),
            Intent::Message { name, text } => {
                let time = self.stamp();
                self.broadcast(ServerEvent::Message(ChatMessage { name, text, time }));
            },
            Intent::Typing(name) => {
                if name.is_empty() {
                    self.typing.clear();
                } else if !self.typing.contains(&name) {
                    self.typing.push(name);
                }
                self.broadcast(ServerEvent::Typing(self.typing.clone()));
            },
            Intent::StopTyping(name) => {
                self.typing.retain(|typist| *typist != name);
                self.broadcast(ServerEvent::Typing(self.typing.clone()));
            },
        }
    }

    /// Take everything queued for a connection.
    pub fn drain(&mut self, id: ConnectionId) -> Vec<ServerEvent> {
        self.connections
            .get_mut(&id)
            .map(|connection| connection.outbox.drain(..).collect())
            .unwrap_or_default()
    }

    /// Whether anything is queued for a connection.
    pub fn has_pending(&self, id: ConnectionId) -> bool {
        self.connections.get(&id).is_some_and(|connection| !connection.outbox.is_empty())
    }

    /// Joined names, in join order.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Names currently typing.
    pub fn typing(&self) -> &[String] {
        &self.typing
    }

    /// Whether a connection is open.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn join(&mut self, id: ConnectionId, username: String) {
        if username.is_empty() {
            return;
        }

        let previous = self
            .connections
            .get_mut(&id)
            .and_then(|connection| connection.username.replace(username.clone()));
        if let Some(previous) = previous.filter(|previous| *previous != username) {
            self.release(&previous);
        }
        if !self.users.contains(&username) {
            self.users.push(username.clone());
        }

        self.broadcast(ServerEvent::UserList(self.users.clone()));
        let notice = ChatMessage {
            name: SERVER_NAME.to_owned(),
            text: format!("{username} joined the chat"),
            time: self.stamp(),
        };
        self.broadcast(ServerEvent::Message(notice));
    }

    /// Forget a name unless another connection still holds it.
    fn release(&mut self, name: &str) {
        let held = self.connections.values().any(|c| c.username.as_deref() == Some(name));
        if !held {
            self.users.retain(|user| user != name);
            self.typing.retain(|typist| typist != name);
        }
    }

    fn broadcast(&mut self, event: ServerEvent) {
        for connection in self.connections.values_mut() {
            connection.outbox.push_back(event.clone());
        }
    }

    fn stamp(&mut self) -> String {
        self.clock.now().format("%H:%M:%S").to_string()
    }
}

/// Room shared between several simulated clients.
pub type SharedSimServer = Arc<Mutex<SimServer>>;

/// Create a shared room with a [`SteppingClock`].
pub fn create_shared_server() -> SharedSimServer {
    Arc::new(Mutex::new(SimServer::new()))
}
