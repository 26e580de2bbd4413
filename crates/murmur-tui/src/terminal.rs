//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Each handle gets its own
//! transport: a WebSocket task when a server is given, or a connection on an
//! in-process room when running offline.

use std::{
    collections::{BTreeMap, VecDeque},
    io::{self, Stdout, stdout},
    sync::{MutexGuard, PoisonError},
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use murmur_app::{AppEvent, Driver, KeyInput, View};
use murmur_client::{
    TransportConfig, TransportEvent,
    transport::{self, ConnectedClient},
};
use murmur_core::HandleId;
use murmur_harness::{ConnectionId, SharedSimServer, SimServer};
use murmur_proto::Intent;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tracing::debug;

use crate::ui;

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Where handles connect to.
pub enum Connection {
    /// A chat server over WebSocket.
    Online(TransportConfig),
    /// An in-process room.
    Offline(SharedSimServer),
}

/// Transport behind one open handle.
enum Link {
    Remote(ConnectedClient),
    Local(ConnectionId),
}

/// One transport per open handle.
///
/// Sending is best-effort and never fails: a link that stopped or is backed
/// up drops the intent, and the connection manager learns about the link
/// from its notifications instead.
struct Transports {
    connection: Connection,
    links: BTreeMap<HandleId, Link>,
    /// Events produced synchronously by the offline room.
    local_events: VecDeque<(HandleId, TransportEvent)>,
}

impl Transports {
    fn new(connection: Connection) -> Self {
        Self { connection, links: BTreeMap::new(), local_events: VecDeque::new() }
    }

    fn room(server: &SharedSimServer) -> MutexGuard<'_, SimServer> {
        server.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(&mut self, handle: HandleId) {
        let link = match &self.connection {
            Connection::Online(config) => Link::Remote(transport::spawn(config.clone())),
            Connection::Offline(server) => {
                let id = Self::room(server).connect();
                self.local_events.push_back((handle, TransportEvent::Connected));
                Link::Local(id)
            },
        };
        debug!(%handle, "opened");
        if let Some(previous) = self.links.insert(handle, link) {
            self.shut(previous);
        }
    }

    fn close(&mut self, handle: HandleId) {
        if let Some(link) = self.links.remove(&handle) {
            debug!(%handle, "closed");
            self.shut(link);
        }
    }

    fn emit(&mut self, handle: HandleId, intent: Intent) {
        match (self.links.get(&handle), &self.connection) {
            (Some(Link::Remote(client)), _) => {
                client.offer(intent);
            },
            (Some(Link::Local(id)), Connection::Offline(server)) => {
                Self::room(server).handle(*id, intent);
            },
            _ => debug!(%handle, event = intent.name(), "emit without transport"),
        }
    }

    fn recv(&mut self) -> Option<(HandleId, TransportEvent)> {
        if let Some(event) = self.local_events.pop_front() {
            return Some(event);
        }

        for (handle, link) in &mut self.links {
            match link {
                Link::Remote(client) => {
                    if let Ok(event) = client.from_server.try_recv() {
                        return Some((*handle, event));
                    }
                },
                Link::Local(id) => {
                    if let Connection::Offline(server) = &self.connection {
                        let events = Self::room(server).drain(*id);
                        self.local_events.extend(
                            events.into_iter().map(|event| (*handle, TransportEvent::Received(event))),
                        );
                    }
                },
            }
        }

        self.local_events.pop_front()
    }

    fn stop(&mut self) {
        let links = std::mem::take(&mut self.links);
        for link in links.into_values() {
            self.shut(link);
        }
    }

    fn shut(&self, link: Link) {
        match (link, &self.connection) {
            (Link::Remote(client), _) => client.stop(),
            (Link::Local(id), Connection::Offline(server)) => Self::room(server).disconnect(id),
            (Link::Local(_), Connection::Online(_)) => {},
        }
    }
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), and one transport
/// per open handle.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    transports: Transports,
}

impl TerminalDriver {
    /// Create a new terminal driver and take over the terminal.
    pub fn new(connection: Connection) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self { terminal, event_stream, transports: Transports::new(connection) })
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        let timeout = tokio::time::Duration::from_millis(100);

        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                        Ok(Self::convert_key(key_event.code).map(AppEvent::Key))
                    },
                    Some(Ok(Event::Resize(cols, rows))) => Ok(Some(AppEvent::Resize(cols, rows))),
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    _ => Ok(None),
                }
            }

            // Tick timeout
            () = tokio::time::sleep(timeout) => {
                Ok(Some(AppEvent::Tick))
            }
        }
    }

    fn open(&mut self, handle: HandleId) -> Result<(), Self::Error> {
        self.transports.open(handle);
        Ok(())
    }

    fn close(&mut self, handle: HandleId) {
        self.transports.close(handle);
    }

    async fn emit(&mut self, handle: HandleId, intent: Intent) -> Result<(), Self::Error> {
        self.transports.emit(handle, intent);
        Ok(())
    }

    fn recv_transport(&mut self) -> Option<(HandleId, TransportEvent)> {
        self.transports.recv()
    }

    fn render(&mut self, view: &View<'_>) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| {
            ui::render(frame, view);
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        self.transports.stop();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
