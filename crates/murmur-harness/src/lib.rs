//! Deterministic simulation harness for murmur.
//!
//! In-memory implementations of the room server and the platform driver for
//! deterministic, reproducible testing of the full client stack.
//!
//! # Reference Room
//!
//! [`SimServer`] models the authoritative chat room: who is connected, who
//! joined under which name, who is typing. Every client event reaches it
//! synchronously, so a test decides exactly when broadcasts are delivered.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the session
//! invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_server;

pub use invariants::{
    ClientSnapshot, EmptyViewWithoutSession, HandleIffIdentity, Invariant, InvariantRegistry,
    InvariantResult, RoomSnapshot, RosterConvergence, SystemSnapshot, TranscriptAppendOnly,
    Violation,
};
pub use sim_driver::{DriverCall, SimDriver, SimDriverError};
pub use sim_server::{
    Clock, ConnectionId, SharedSimServer, SimServer, SteppingClock, SystemClock,
    create_shared_server,
};
