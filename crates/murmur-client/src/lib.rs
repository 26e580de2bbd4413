//! Client
//!
//! Connection manager for a murmur chat session. Owns the participant's
//! identity, the live connection-handle and the synchronized room view.
//!
//! # Architecture
//!
//! The client follows the Sans-IO and Action-Based patterns of
//! [`murmur_core`]. It receives events ([`ClientEvent`]), processes them
//! through pure state machine logic, and returns actions ([`ClientAction`])
//! for the caller to execute in order.
//!
//! Exactly one connection-handle exists while an identity is set. Every
//! transport notification is tagged with the [`HandleId`] it came from, and
//! anything not tagged with the live handle is discarded. That comparison is
//! the whole cancellation story: closing a handle does not stop callbacks
//! that are already in flight.
//!
//! # Components
//!
//! - [`Client`]: session state machine
//! - [`ClientEvent`]: events fed into the client
//! - [`ClientAction`]: actions produced by the client
//! - [`TransportEvent`]: notifications a transport reports for one handle
//! - [`ReconnectPolicy`]: bounded retry schedule used by the transport
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::ConnectedClient`]: channels to a background WebSocket task
//! - [`transport::spawn`]: start a connection task for one handle

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod config;
mod event;

#[cfg(feature = "transport")]
pub mod transport;

pub use client::Client;
pub use config::{ReconnectPolicy, TransportConfig};
pub use event::{ClientAction, ClientEvent, SessionPhase, TransportEvent};
pub use murmur_core::{HandleId, Identity, SyncState};
pub use murmur_proto::{Intent, ServerEvent};
