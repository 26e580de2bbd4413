//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`murmur_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Every handle the runtime opens becomes a connection on a shared
//! [`SimServer`](crate::SimServer). Links can be dropped and restored, and
//! arbitrary transport events can be injected for any handle, dead ones
//! included, to replay late deliveries.

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use murmur_app::{AppEvent, Bridge, Driver, KeyInput, View};
use murmur_client::{SessionPhase, TransportEvent};
use murmur_core::{HandleId, Message};
use murmur_proto::Intent;

use crate::{
    ConnectionId, SharedSimServer, SimServer,
    invariants::{ClientSnapshot, InvariantRegistry, RoomSnapshot, SystemSnapshot},
};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Transport call made by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    /// Handle opened.
    Open(HandleId),
    /// Handle closed.
    Close(HandleId),
    /// Intent sent on a handle.
    Emit {
        /// Handle used.
        handle: HandleId,
        /// Intent sent.
        intent: Intent,
    },
}

/// Transport of one open handle.
#[derive(Debug, Default)]
struct Link {
    /// Server connection while the link is up.
    connection: Option<ConnectionId>,
    /// Intents sent while the link was down, replayed on restore.
    backlog: Vec<Intent>,
}

/// Shared state for event injection.
///
/// This allows injection from outside async contexts.
#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    transport: VecDeque<(HandleId, TransportEvent)>,
    links: BTreeMap<HandleId, Link>,
    calls: Vec<DriverCall>,
    transcript_history: Vec<(HandleId, Vec<Message>)>,
    frames: usize,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] trait so the same [`murmur_app::Runtime`]
/// orchestration code runs in both production TUI and simulation tests.
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    server: SharedSimServer,
    invariants: Option<InvariantRegistry>,
}

impl SimDriver {
    /// Create a driver whose handles connect to `server`.
    pub fn new(server: SharedSimServer) -> Self {
        Self { state: Arc::new(Mutex::new(SharedState::default())), server, invariants: None }
    }

    /// Enable invariant checking.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// The room this driver connects to.
    pub fn server(&self) -> &SharedSimServer {
        &self.server
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().pending_events.push_back(event);
    }

    /// Inject a tick event.
    pub fn inject_tick(&self) {
        self.inject_event(AppEvent::Tick);
    }

    /// Type a line into the composer and press Enter.
    pub fn type_line(&self, line: &str) {
        let mut state = self.lock();
        state.pending_events.extend(line.chars().map(|c| AppEvent::Key(KeyInput::Char(c))));
        state.pending_events.push_back(AppEvent::Key(KeyInput::Enter));
    }

    /// Inject a transport event for any handle, live or not.
    ///
    /// Events for a closed handle model deliveries that were already in
    /// flight when it was torn down.
    pub fn inject_transport(&self, handle: HandleId, event: TransportEvent) {
        self.lock().transport.push_back((handle, event));
    }

    /// Cut the link beneath an open handle. The handle stays open.
    pub fn drop_link(&self, handle: HandleId) {
        let mut state = self.lock();
        let Some(connection) = state.links.get_mut(&handle).and_then(|l| l.connection.take())
        else {
            return;
        };
        self.room().disconnect(connection);
        state
            .transport
            .push_back((handle, TransportEvent::Disconnected { reason: "link dropped".into() }));
    }

    /// Reconnect a dropped link, replaying intents sent while it was down.
    pub fn restore_link(&self, handle: HandleId) {
        let mut state = self.lock();
        let Some(link) = state.links.get_mut(&handle) else {
            return;
        };
        if link.connection.is_some() {
            return;
        }

        let backlog = std::mem::take(&mut link.backlog);
        let mut room = self.room();
        let connection = room.connect();
        link.connection = Some(connection);
        for intent in backlog {
            room.handle(connection, intent);
        }
        drop(room);
        state.transport.push_back((handle, TransportEvent::Connected));
    }

    /// Transport calls made so far.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.lock().calls.clone()
    }

    /// Take all recorded transport calls.
    pub fn take_calls(&self) -> Vec<DriverCall> {
        std::mem::take(&mut self.lock().calls)
    }

    /// Handles currently open.
    pub fn open_handles(&self) -> Vec<HandleId> {
        self.lock().links.keys().copied().collect()
    }

    /// Number of frames rendered.
    pub fn frames(&self) -> usize {
        self.lock().frames
    }

    /// Whether `stop` was called.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        let state = self.lock();
        if !state.pending_events.is_empty() || !state.transport.is_empty() {
            return true;
        }
        let room = self.room();
        state.links.values().filter_map(|link| link.connection).any(|id| room.has_pending(id))
    }

    /// Create a snapshot of one client for invariant checking.
    pub fn snapshot(&self, id: u64, bridge: &Bridge) -> ClientSnapshot {
        let state = self.lock();
        let client = bridge.client();
        let session = bridge.state();

        ClientSnapshot {
            id,
            identity: client.identity().map(|identity| identity.as_str().to_owned()),
            handle: client.handle(),
            open_handles: state.links.keys().copied().collect(),
            online: client.phase() == SessionPhase::Joined && client.link_up(),
            transcript: session.transcript().messages().to_vec(),
            roster: session.roster().iter().map(|name| name.as_str().to_owned()).collect(),
            typing: session.typing().iter().map(|name| name.as_str().to_owned()).collect(),
            transcript_history: state.transcript_history.clone(),
        }
    }

    /// Snapshot of the room.
    pub fn room_snapshot(&self) -> RoomSnapshot {
        RoomSnapshot::from_server(&self.room())
    }

    /// Check invariants against one client.
    pub fn check_invariants(&self, bridge: &Bridge, context: &str) {
        if let Some(ref registry) = self.invariants {
            let snapshot = SystemSnapshot::single(self.snapshot(0, bridge));
            registry.assert_all(&snapshot, context);
        }
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn room(&self) -> MutexGuard<'_, SimServer> {
        self.server.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.lock().pending_events.pop_front())
    }

    fn open(&mut self, handle: HandleId) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if state.links.contains_key(&handle) {
            return Err(SimDriverError(format!("{handle} is already open")));
        }

        let connection = self.room().connect();
        state.links.insert(handle, Link { connection: Some(connection), backlog: Vec::new() });
        state.calls.push(DriverCall::Open(handle));
        state.transport.push_back((handle, TransportEvent::Connected));
        Ok(())
    }

    fn close(&mut self, handle: HandleId) {
        let mut state = self.lock();
        state.calls.push(DriverCall::Close(handle));
        if let Some(connection) = state.links.remove(&handle).and_then(|link| link.connection) {
            self.room().disconnect(connection);
        }
    }

    async fn emit(&mut self, handle: HandleId, intent: Intent) -> Result<(), Self::Error> {
        let mut state = self.lock();
        state.calls.push(DriverCall::Emit { handle, intent: intent.clone() });

        let Some(link) = state.links.get_mut(&handle) else {
            return Err(SimDriverError(format!("emit on closed handle {handle}")));
        };
        match link.connection {
            Some(connection) => self.room().handle(connection, intent),
            None => link.backlog.push(intent),
        }
        Ok(())
    }

    fn recv_transport(&mut self) -> Option<(HandleId, TransportEvent)> {
        let mut state = self.lock();

        if state.transport.is_empty() {
            let mut room = self.room();
            let mut delivered = Vec::new();
            for (handle, link) in &state.links {
                if let Some(connection) = link.connection {
                    delivered.extend(
                        room.drain(connection)
                            .into_iter()
                            .map(|event| (*handle, TransportEvent::Received(event))),
                    );
                }
            }
            drop(room);
            state.transport.extend(delivered);
        }

        state.transport.pop_front()
    }

    fn render(&mut self, view: &View<'_>) -> Result<(), Self::Error> {
        let mut state = self.lock();
        state.frames += 1;

        let live = state.links.keys().next().copied();
        if let (Some(handle), Some(_)) = (live, view.identity) {
            let messages = view.session.transcript().messages().to_vec();
            state.transcript_history.push((handle, messages));
        }
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.lock();
        let links = std::mem::take(&mut state.links);
        let mut room = self.room();
        for connection in links.into_values().filter_map(|link| link.connection) {
            room.disconnect(connection);
        }
        state.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use murmur_proto::ServerEvent;

    use super::*;
    use crate::create_shared_server;

    #[test]
    fn inject_event_queues_event() {
        let driver = SimDriver::new(create_shared_server());
        driver.inject_tick();

        assert!(driver.has_pending());
    }

    #[tokio::test]
    async fn open_connects_and_reports_connected() {
        let mut driver = SimDriver::new(create_shared_server());
        let h1 = HandleId::FIRST;

        driver.open(h1).unwrap();
        driver.emit(h1, Intent::Join { username: "alice".into() }).await.unwrap();

        assert_eq!(driver.recv_transport(), Some((h1, TransportEvent::Connected)));
        let Some((handle, TransportEvent::Received(ServerEvent::UserList(names)))) =
            driver.recv_transport()
        else {
            panic!("expected roster");
        };
        assert_eq!(handle, h1);
        assert_eq!(names, ["alice"]);
    }

    #[tokio::test]
    async fn emit_on_closed_handle_fails() {
        let mut driver = SimDriver::new(create_shared_server());
        assert!(driver.emit(HandleId::FIRST, Intent::Typing("x".into())).await.is_err());
    }

    #[tokio::test]
    async fn dropped_link_buffers_until_restored() {
        let server = create_shared_server();
        let mut driver = SimDriver::new(server.clone());
        let h1 = HandleId::FIRST;
        driver.open(h1).unwrap();
        driver.drop_link(h1);

        driver.emit(h1, Intent::Join { username: "alice".into() }).await.unwrap();
        assert!(server.lock().unwrap().users().is_empty());

        driver.restore_link(h1);
        assert_eq!(server.lock().unwrap().users(), ["alice"]);
    }

    #[test]
    fn close_disconnects_from_room() {
        let server = create_shared_server();
        let mut driver = SimDriver::new(server.clone());
        driver.open(HandleId::FIRST).unwrap();
        assert_eq!(server.lock().unwrap().connection_count(), 1);

        driver.close(HandleId::FIRST);
        assert_eq!(server.lock().unwrap().connection_count(), 0);
        assert!(driver.open_handles().is_empty());
    }
}
