//! Full-stack simulation: several runtimes sharing one reference room.
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks that verify:
//! - Every client's view matches the room once nothing is in flight
//! - Transcripts hold exactly the server's broadcasts, in order
//! - The session invariants held at every quiescent point

use murmur_app::{ConnectionState, MemoryStore, Runtime};
use murmur_client::TransportEvent;
use murmur_core::HandleId;
use murmur_harness::{
    DriverCall, InvariantRegistry, SharedSimServer, SimDriver, SystemSnapshot, create_shared_server,
};
use murmur_proto::{ChatMessage, Intent, ServerEvent};

type Sim = Runtime<SimDriver, MemoryStore>;

async fn client(server: &SharedSimServer) -> Sim {
    let driver = SimDriver::new(server.clone()).with_invariants(InvariantRegistry::standard());
    let mut runtime = Runtime::new(driver, MemoryStore::new(), "sim");
    runtime.start().await.unwrap();
    runtime
}

/// Step every runtime until nothing is left in flight.
async fn settle(clients: &mut [&mut Sim]) {
    loop {
        let mut progressed = false;
        for runtime in clients.iter_mut() {
            while runtime.driver().has_pending() {
                runtime.step().await.unwrap();
                progressed = true;
            }
        }
        if !progressed {
            return;
        }
    }
}

/// Check the standard invariants over all clients and the room.
fn check(clients: &[&mut Sim], context: &str) {
    for runtime in clients {
        runtime.driver().check_invariants(runtime.bridge(), context);
    }
    let snapshots = clients
        .iter()
        .enumerate()
        .map(|(id, runtime)| runtime.driver().snapshot(id as u64, runtime.bridge()))
        .collect();
    let room = clients[0].driver().room_snapshot();
    let snapshot = SystemSnapshot::from_clients(snapshots).with_room(room);
    InvariantRegistry::standard().assert_all(&snapshot, context);
}

fn texts(runtime: &Sim) -> Vec<String> {
    runtime
        .bridge()
        .state()
        .transcript()
        .iter()
        .map(|m| format!("{}: {}", m.sender(), m.text()))
        .collect()
}

fn roster(runtime: &Sim) -> Vec<String> {
    runtime.bridge().state().roster().iter().map(|n| n.as_str().to_owned()).collect()
}

#[tokio::test]
async fn two_clients_chat() {
    let server = create_shared_server();
    let mut alice = client(&server).await;
    let mut bob = client(&server).await;

    alice.driver().type_line("alice");
    settle(&mut [&mut alice, &mut bob]).await;
    bob.driver().type_line("bob");
    settle(&mut [&mut alice, &mut bob]).await;

    alice.driver().type_line("hello bob");
    settle(&mut [&mut alice, &mut bob]).await;

    // Oracle
    assert_eq!(roster(&alice), ["alice", "bob"]);
    assert_eq!(roster(&bob), ["alice", "bob"]);
    assert_eq!(
        texts(&alice),
        ["Server: alice joined the chat", "Server: bob joined the chat", "alice: hello bob"]
    );
    assert_eq!(texts(&bob), ["Server: bob joined the chat", "alice: hello bob"]);
    assert!(alice.bridge().state().typing().is_empty());
    assert_eq!(alice.app().connection_state(), ConnectionState::Online);
    check(&[&mut alice, &mut bob], "after chat");
}

#[tokio::test]
async fn typing_indicator_reaches_others() {
    let server = create_shared_server();
    let mut alice = client(&server).await;
    let mut bob = client(&server).await;
    alice.driver().type_line("alice");
    bob.driver().type_line("bob");
    settle(&mut [&mut alice, &mut bob]).await;

    for c in "hi".chars() {
        alice.driver().inject_event(murmur_app::AppEvent::Key(murmur_app::KeyInput::Char(c)));
    }
    settle(&mut [&mut alice, &mut bob]).await;
    let typing: Vec<_> = bob.bridge().state().typing().iter().map(|n| n.as_str()).collect();
    assert_eq!(typing, ["alice"]);

    alice.driver().inject_event(murmur_app::AppEvent::Key(murmur_app::KeyInput::Enter));
    settle(&mut [&mut alice, &mut bob]).await;

    // Oracle
    assert!(bob.bridge().state().typing().is_empty());
    check(&[&mut alice, &mut bob], "after send");
}

#[tokio::test]
async fn rename_discards_in_flight_events() {
    let server = create_shared_server();
    let mut me = client(&server).await;
    let h1 = HandleId::FIRST;

    me.driver().type_line("alice");
    settle(&mut [&mut me]).await;
    assert!(!texts(&me).is_empty());

    me.driver().type_line("/nick carol");
    settle(&mut [&mut me]).await;

    // A message that was already on its way on the old link
    let late = ChatMessage { name: "bob".into(), text: "for alice".into(), time: "12:00:00".into() };
    me.driver().inject_transport(h1, TransportEvent::Received(ServerEvent::Message(late)));
    me.driver().inject_transport(h1, TransportEvent::Disconnected { reason: "closed".into() });
    settle(&mut [&mut me]).await;

    // Oracle
    let calls = me.driver().calls();
    let close = calls.iter().position(|c| *c == DriverCall::Close(h1));
    let open = calls.iter().position(|c| *c == DriverCall::Open(h1.next()));
    assert!(close.is_some() && close < open);
    assert_eq!(texts(&me), ["Server: carol joined the chat"]);
    assert_eq!(roster(&me), ["carol"]);
    assert_eq!(me.app().connection_state(), ConnectionState::Online);
    check(&[&mut me], "after rename");
}

#[tokio::test]
async fn leave_releases_name_everywhere() {
    let server = create_shared_server();
    let mut alice = client(&server).await;
    let mut bob = client(&server).await;
    alice.driver().type_line("alice");
    bob.driver().type_line("bob");
    settle(&mut [&mut alice, &mut bob]).await;

    alice.driver().type_line("/leave");
    settle(&mut [&mut alice, &mut bob]).await;

    // Oracle
    assert_eq!(roster(&bob), ["bob"]);
    assert!(alice.bridge().state().is_empty());
    assert_eq!(alice.app().connection_state(), ConnectionState::Idle);
    assert!(alice.driver().open_handles().is_empty());
    check(&[&mut alice, &mut bob], "after leave");
}

#[tokio::test]
async fn link_drop_rejoins_and_keeps_transcript() {
    let server = create_shared_server();
    let mut alice = client(&server).await;
    let mut bob = client(&server).await;
    alice.driver().type_line("alice");
    bob.driver().type_line("bob");
    settle(&mut [&mut alice, &mut bob]).await;
    let before = texts(&alice);

    let h1 = HandleId::FIRST;
    alice.driver().drop_link(h1);
    settle(&mut [&mut alice, &mut bob]).await;
    assert_eq!(alice.app().connection_state(), ConnectionState::Offline);
    assert_eq!(roster(&bob), ["bob"]);

    alice.driver().take_calls();
    alice.driver().restore_link(h1);
    settle(&mut [&mut alice, &mut bob]).await;

    // Oracle
    assert_eq!(
        alice.driver().calls(),
        [DriverCall::Emit { handle: h1, intent: Intent::Join { username: "alice".into() } }]
    );
    assert_eq!(alice.app().connection_state(), ConnectionState::Online);
    assert!(texts(&alice).starts_with(&before));
    assert_eq!(roster(&bob), ["bob", "alice"]);
    check(&[&mut alice, &mut bob], "after reconnect");
}

#[tokio::test]
async fn quit_disconnects_without_forgetting_name() {
    let server = create_shared_server();
    let mut alice = client(&server).await;
    alice.driver().type_line("alice");
    settle(&mut [&mut alice]).await;

    alice.driver().type_line("/quit");
    let mut quit = false;
    while alice.driver().has_pending() && !quit {
        quit = alice.step().await.unwrap();
    }
    assert!(quit);
    alice.shutdown().await.unwrap();

    // Oracle
    assert!(alice.driver().is_stopped());
    assert_eq!(server.lock().unwrap().connection_count(), 0);
    assert!(server.lock().unwrap().users().is_empty());
}
