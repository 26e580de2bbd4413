//! Runtime orchestration against a scripted driver.

use std::{collections::VecDeque, io};

use murmur_app::{
    AppEvent, ConnectionState, Driver, KeyInput, MemoryStore, Preferences, Runtime, Theme, View,
};
use murmur_client::TransportEvent;
use murmur_core::HandleId;
use murmur_proto::{ChatMessage, Intent, ServerEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Open(HandleId),
    Close(HandleId),
    Emit(HandleId, Intent),
    Stop,
}

/// Driver that replays queued input and records what the runtime did.
#[derive(Default)]
struct ScriptedDriver {
    input: VecDeque<AppEvent>,
    transport: VecDeque<(HandleId, TransportEvent)>,
    calls: Vec<Call>,
    frames: usize,
    last_transcript_len: usize,
}

impl ScriptedDriver {
    fn type_line(&mut self, line: &str) {
        self.input.extend(line.chars().map(|c| AppEvent::Key(KeyInput::Char(c))));
        self.input.push_back(AppEvent::Key(KeyInput::Enter));
    }

    fn emitted(&self) -> Vec<&Intent> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Emit(_, intent) => Some(intent),
                _ => None,
            })
            .collect()
    }
}

impl Driver for ScriptedDriver {
    type Error = io::Error;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.input.pop_front())
    }

    fn open(&mut self, handle: HandleId) -> Result<(), Self::Error> {
        self.calls.push(Call::Open(handle));
        Ok(())
    }

    fn close(&mut self, handle: HandleId) {
        self.calls.push(Call::Close(handle));
    }

    async fn emit(&mut self, handle: HandleId, intent: Intent) -> Result<(), Self::Error> {
        self.calls.push(Call::Emit(handle, intent));
        Ok(())
    }

    fn recv_transport(&mut self) -> Option<(HandleId, TransportEvent)> {
        self.transport.pop_front()
    }

    fn render(&mut self, view: &View<'_>) -> Result<(), Self::Error> {
        self.frames += 1;
        self.last_transcript_len = view.session.transcript().len();
        Ok(())
    }

    fn stop(&mut self) {
        self.calls.push(Call::Stop);
    }
}

async fn drain(runtime: &mut Runtime<ScriptedDriver, MemoryStore>) -> bool {
    while !runtime.driver().input.is_empty() || !runtime.driver().transport.is_empty() {
        if runtime.step().await.unwrap() {
            return true;
        }
    }
    false
}

#[tokio::test]
async fn stored_name_auto_joins() {
    let store = MemoryStore::with(Preferences { display_name: Some("alice".into()), dark_mode: true });
    let mut runtime = Runtime::new(ScriptedDriver::default(), store, "local");

    runtime.start().await.unwrap();

    assert_eq!(runtime.app().theme(), Theme::Dark);
    assert_eq!(runtime.driver().calls[0], Call::Open(HandleId::FIRST));
    assert_eq!(runtime.driver().emitted(), vec![&Intent::Join { username: "alice".into() }]);
    assert_eq!(runtime.app().connection_state(), ConnectionState::Connecting);
}

#[tokio::test]
async fn command_line_name_wins_and_is_persisted() {
    let store = MemoryStore::with(Preferences { display_name: Some("alice".into()), dark_mode: false });
    let observer = store.clone();
    let mut runtime =
        Runtime::new(ScriptedDriver::default(), store, "local").with_initial_name("  bob ");

    runtime.start().await.unwrap();

    assert_eq!(runtime.driver().emitted(), vec![&Intent::Join { username: "bob".into() }]);
    assert_eq!(observer.snapshot().display_name.as_deref(), Some("bob"));
}

#[tokio::test]
async fn no_stored_name_waits_on_join_screen() {
    let mut runtime = Runtime::new(ScriptedDriver::default(), MemoryStore::new(), "local");
    runtime.start().await.unwrap();

    assert!(runtime.driver().calls.is_empty());
    assert_eq!(runtime.driver().frames, 1);
    assert_eq!(runtime.app().connection_state(), ConnectionState::Idle);
}

#[tokio::test]
async fn chat_round_trip_renders_echo() {
    let store = MemoryStore::new();
    let observer = store.clone();
    let mut runtime = Runtime::new(ScriptedDriver::default(), store, "local");
    runtime.start().await.unwrap();

    runtime.driver_mut().type_line("alice");
    drain(&mut runtime).await;
    assert_eq!(observer.snapshot().display_name.as_deref(), Some("alice"));

    let h1 = HandleId::FIRST;
    let echo = ChatMessage { name: "alice".into(), text: "hi".into(), time: "10:00:00".into() };
    runtime.driver_mut().transport.push_back((h1, TransportEvent::Connected));
    runtime.driver_mut().type_line("hi");
    runtime.driver_mut().transport.push_back((h1, TransportEvent::Received(ServerEvent::Message(echo))));
    drain(&mut runtime).await;

    assert!(runtime.driver().emitted().contains(&&Intent::Message { name: "alice".into(), text: "hi".into() }));
    assert_eq!(runtime.driver().last_transcript_len, 1);
    assert_eq!(runtime.app().connection_state(), ConnectionState::Online);
}

#[tokio::test]
async fn leave_forgets_name_and_theme_persists() {
    let store = MemoryStore::with(Preferences { display_name: Some("alice".into()), dark_mode: false });
    let observer = store.clone();
    let mut runtime = Runtime::new(ScriptedDriver::default(), store, "local");
    runtime.start().await.unwrap();

    runtime.driver_mut().type_line("/theme");
    runtime.driver_mut().type_line("/leave");
    drain(&mut runtime).await;

    assert_eq!(observer.snapshot(), Preferences { display_name: None, dark_mode: true });
    assert!(runtime.driver().calls.contains(&Call::Close(HandleId::FIRST)));
}

#[tokio::test]
async fn quit_closes_and_stops_but_keeps_name() {
    let store = MemoryStore::with(Preferences { display_name: Some("alice".into()), dark_mode: false });
    let observer = store.clone();
    let mut runtime = Runtime::new(ScriptedDriver::default(), store, "local");
    runtime.start().await.unwrap();

    runtime.driver_mut().input.push_back(AppEvent::Key(KeyInput::Esc));
    assert!(drain(&mut runtime).await);
    runtime.shutdown().await.unwrap();

    let calls = &runtime.driver().calls;
    assert_eq!(calls[calls.len() - 2], Call::Close(HandleId::FIRST));
    assert_eq!(calls.last(), Some(&Call::Stop));
    assert_eq!(observer.snapshot().display_name.as_deref(), Some("alice"));
}
