//! Fuzz target for Packet::decode and the chat event parsers
//!
//! Feeds arbitrary text through the Engine.IO/Socket.IO decoder and, for
//! event packets, through both event parsers.
//!
//! The decoder should NEVER panic. All invalid inputs should return an error,
//! and anything that decodes must encode again.

#![no_main]

use libfuzzer_sys::fuzz_target;
use murmur_proto::{Intent, Packet, ServerEvent};

fuzz_target!(|text: &str| {
    let Ok(packet) = Packet::decode(text) else {
        return;
    };

    assert!(packet.encode().is_ok(), "decoded packet failed to encode: {packet:?}");

    if let Packet::Event(event) = packet {
        let _ = ServerEvent::from_packet(event.clone());
        let _ = Intent::from_packet(event);
    }
});
