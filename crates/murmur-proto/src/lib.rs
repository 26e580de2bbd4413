//! Wire protocol for murmur.
//!
//! The chat room speaks Socket.IO over a WebSocket. This crate owns both
//! layers of that wire:
//!
//! - [`Packet`]: Engine.IO v4 text packets and the Socket.IO v5 message
//!   packets carried inside them (connect, disconnect, event, connect error).
//! - [`Intent`] and [`ServerEvent`]: the typed chat events carried by
//!   Socket.IO event packets, one enum per direction.
//!
//! Nothing here performs I/O. Transports decode text frames into [`Packet`]s
//! and hand event packets to [`ServerEvent::from_packet`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod event;
pub mod packet;

pub use errors::{ProtocolError, Result};
pub use event::{ChatMessage, Intent, ServerEvent};
pub use packet::{EventPacket, Handshake, Packet};
