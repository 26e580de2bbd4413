//! Fuzz target for the connection manager
//!
//! Drives a Client with arbitrary sequences of user actions and transport
//! notifications, including notifications tagged with stale or unknown
//! handles.
//!
//! # Invariants
//!
//! - At most one handle is open, and it is the client's live handle
//! - Close of a handle is emitted before the Open of its replacement
//! - Intents are only emitted on the live handle
//! - Without an identity the view is empty
//! - The transcript only grows while the handle stays the same

#![no_main]

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use murmur_client::{Client, ClientAction, ClientEvent, HandleId, Identity, TransportEvent};
use murmur_proto::{ChatMessage, ServerEvent};

#[derive(Debug, Arbitrary)]
enum Op {
    Choose(u8),
    Clear,
    Send(String),
    Keystroke,
    Shutdown,
    Transport { handle_offset: u8, event: Notification },
}

#[derive(Debug, Arbitrary)]
enum Notification {
    Connected,
    Disconnected,
    Failed,
    Message { name: u8, text: String },
    UserList(Vec<u8>),
    Typing(Vec<u8>),
}

const NAMES: [&str; 4] = ["alice", "bob", "carol", "  "];

fn name(index: u8) -> String {
    NAMES[usize::from(index) % NAMES.len()].to_string()
}

impl Notification {
    fn into_event(self) -> TransportEvent {
        match self {
            Self::Connected => TransportEvent::Connected,
            Self::Disconnected => TransportEvent::Disconnected { reason: "fuzz".into() },
            Self::Failed => TransportEvent::Failed { reason: "fuzz".into() },
            Self::Message { name: sender, text } => {
                TransportEvent::Received(ServerEvent::Message(ChatMessage {
                    name: name(sender),
                    text,
                    time: "00:00:00".into(),
                }))
            },
            Self::UserList(names) => {
                TransportEvent::Received(ServerEvent::UserList(names.into_iter().map(name).collect()))
            },
            Self::Typing(names) => {
                TransportEvent::Received(ServerEvent::Typing(names.into_iter().map(name).collect()))
            },
        }
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let mut client = Client::new();
    let mut open: BTreeSet<HandleId> = BTreeSet::new();

    for op in ops {
        let before_handle = client.handle();
        let before_len = client.state().transcript().len();

        let event = match op {
            Op::Choose(index) => match Identity::new(&name(index)) {
                Ok(identity) => ClientEvent::ChooseIdentity(identity),
                Err(_) => continue,
            },
            Op::Clear => ClientEvent::ClearIdentity,
            Op::Send(text) => ClientEvent::SendMessage { text },
            Op::Keystroke => ClientEvent::Keystroke,
            Op::Shutdown => ClientEvent::Shutdown,
            Op::Transport { handle_offset, event } => {
                let live = client.handle().unwrap_or(HandleId::FIRST).get();
                let raw = live.saturating_sub(u64::from(handle_offset % 3));
                ClientEvent::Transport { handle: HandleId::new(raw.max(1)), event: event.into_event() }
            },
        };

        for action in client.handle_event(event) {
            match action {
                ClientAction::Open { handle } => {
                    assert!(open.is_empty(), "open {handle} while {open:?} still open");
                    open.insert(handle);
                },
                ClientAction::Close { handle } => {
                    assert!(open.remove(&handle), "close of unopened {handle}");
                },
                ClientAction::Emit { handle, .. } => {
                    assert!(open.contains(&handle), "emit on closed {handle}");
                },
                ClientAction::PhaseChanged(_)
                | ClientAction::LinkChanged { .. }
                | ClientAction::SessionUpdated => {},
            }
        }

        assert_eq!(open.iter().next().copied(), client.handle());
        if client.identity().is_none() {
            assert!(client.state().is_empty());
        }
        if client.handle().is_some() && client.handle() == before_handle {
            assert!(client.state().transcript().len() >= before_len);
        }
    }
});
