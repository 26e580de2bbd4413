//! Client state machine.
//!
//! The `Client` owns one session at a time: the chosen identity, the live
//! connection-handle and the view synchronized from that handle's events.

use murmur_core::{HandleId, Identity, SyncState};
use murmur_proto::{Intent, ServerEvent};
use tracing::{debug, info, warn};

use crate::event::{ClientAction, ClientEvent, SessionPhase, TransportEvent};

/// State tied to the live handle. Dropped wholesale on teardown.
#[derive(Debug)]
struct Session {
    identity: Identity,
    handle: HandleId,
    phase: SessionPhase,
    link_up: bool,
    /// The transport exhausted its retries; the handle is dead.
    gave_up: bool,
}

/// Connection manager for one chat participant.
///
/// A handle is alive iff an identity is set. Changing the identity closes
/// the old handle before opening the next one, and the view restarts empty
/// with every new handle.
#[derive(Debug)]
pub struct Client {
    next_handle: HandleId,
    session: Option<Session>,
    state: SyncState,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Create a client with no identity.
    pub fn new() -> Self {
        Self { next_handle: HandleId::FIRST, session: None, state: SyncState::new() }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.session.as_ref().map_or(SessionPhase::NoIdentity, |s| s.phase)
    }

    /// Identity of the current session.
    pub fn identity(&self) -> Option<&Identity> {
        self.session.as_ref().map(|s| &s.identity)
    }

    /// Live handle, if any.
    pub fn handle(&self) -> Option<HandleId> {
        self.session.as_ref().map(|s| s.handle)
    }

    /// Whether the link beneath the live handle is up.
    pub fn link_up(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.link_up)
    }

    /// Synchronized view. Empty without a session.
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Process an event and return resulting actions.
    pub fn handle_event(&mut self, event: ClientEvent) -> Vec<ClientAction> {
        match event {
            ClientEvent::ChooseIdentity(identity) => self.establish(identity),
            ClientEvent::ClearIdentity => {
                info!("identity cleared");
                self.teardown()
            },
            ClientEvent::SendMessage { text } => self.send_message(text),
            ClientEvent::Keystroke => self.notify_typing(),
            ClientEvent::Transport { handle, event } => self.handle_transport(handle, event),
            ClientEvent::Shutdown => {
                info!("session shutting down");
                self.teardown()
            },
        }
    }

    fn establish(&mut self, identity: Identity) -> Vec<ClientAction> {
        // Same name on a handle that can still recover: nothing to do
        if self.session.as_ref().is_some_and(|s| s.identity == identity && !s.gave_up) {
            return Vec::new();
        }

        let mut actions = self.teardown();
        // PhaseChanged(NoIdentity) from the teardown is transient noise
        actions.retain(|action| !matches!(action, ClientAction::PhaseChanged(_)));

        let handle = self.next_handle;
        self.next_handle = handle.next();
        info!(%handle, %identity, "opening connection handle");

        actions.push(ClientAction::Open { handle });
        actions.push(ClientAction::Emit {
            handle,
            intent: Intent::Join { username: identity.as_str().to_owned() },
        });
        actions.push(ClientAction::PhaseChanged(SessionPhase::Connecting));

        self.session = Some(Session {
            identity,
            handle,
            phase: SessionPhase::Connecting,
            link_up: false,
            gave_up: false,
        });
        actions
    }

    fn teardown(&mut self) -> Vec<ClientAction> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        info!(handle = %session.handle, "closing connection handle");

        let mut actions = vec![ClientAction::Close { handle: session.handle }];
        if !self.state.is_empty() {
            self.state = SyncState::new();
            actions.push(ClientAction::SessionUpdated);
        }
        actions.push(ClientAction::PhaseChanged(SessionPhase::NoIdentity));
        actions
    }

    fn send_message(&self, text: String) -> Vec<ClientAction> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let Some(session) = &self.session else {
            debug!("message dropped without identity");
            return Vec::new();
        };

        let name = session.identity.as_str().to_owned();
        vec![
            ClientAction::Emit {
                handle: session.handle,
                intent: Intent::Message { name: name.clone(), text },
            },
            ClientAction::Emit { handle: session.handle, intent: Intent::StopTyping(name) },
        ]
    }

    fn notify_typing(&self) -> Vec<ClientAction> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        vec![ClientAction::Emit {
            handle: session.handle,
            intent: Intent::Typing(session.identity.as_str().to_owned()),
        }]
    }

    fn handle_transport(&mut self, handle: HandleId, event: TransportEvent) -> Vec<ClientAction> {
        let Some(session) = self.session.as_mut().filter(|s| s.handle == handle) else {
            debug!(%handle, ?event, "discarding event from stale handle");
            return Vec::new();
        };

        match event {
            TransportEvent::Connected => {
                let was_joined = session.phase == SessionPhase::Joined;
                session.phase = SessionPhase::Joined;
                session.link_up = true;

                let mut actions = vec![ClientAction::LinkChanged { handle, up: true }];
                if was_joined {
                    info!(%handle, "link restored, rejoining");
                    actions.push(ClientAction::Emit {
                        handle,
                        intent: Intent::Join { username: session.identity.as_str().to_owned() },
                    });
                } else {
                    info!(%handle, "joined");
                    actions.push(ClientAction::PhaseChanged(SessionPhase::Joined));
                }
                actions
            },
            TransportEvent::Disconnected { reason } => {
                warn!(%handle, %reason, "link down");
                session.link_up = false;
                vec![ClientAction::LinkChanged { handle, up: false }]
            },
            TransportEvent::Failed { reason } => {
                warn!(%handle, %reason, "transport gave up");
                session.link_up = false;
                session.gave_up = true;
                vec![ClientAction::LinkChanged { handle, up: false }]
            },
            TransportEvent::Received(event) => {
                if session.phase != SessionPhase::Joined {
                    debug!(%handle, event = event.name(), "discarding event before join");
                    return Vec::new();
                }
                self.apply(event)
            },
        }
    }

    fn apply(&mut self, event: ServerEvent) -> Vec<ClientAction> {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(event);
        vec![ClientAction::SessionUpdated]
    }
}
