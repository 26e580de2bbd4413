//! Synchronization core for murmur.
//!
//! Holds the local view of a chat room (transcript, roster and typing level)
//! and the pure reducers that advance it. Every reducer consumes the prior
//! state and one inbound event and returns the next state; nothing in this
//! crate performs I/O or keeps ambient mutable state.
//!
//! # Components
//!
//! - [`Transcript`]: append-only message log in local arrival order
//! - [`Roster`]: participants the server reports as connected
//! - [`TypingSet`]: participants the server reports as typing
//! - [`SyncState`]: the three together, routing [`ServerEvent`]s to reducers
//! - [`HandleId`]: identity of one connection-handle, used to reject stale
//!   deliveries
//!
//! # Invariants
//!
//! - The transcript only grows; appended messages are never touched again.
//! - Roster and typing updates replace the prior value wholesale. The server
//!   is authoritative, so there is no local merge or diff.
//!
//! [`ServerEvent`]: murmur_proto::ServerEvent

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod handle;
mod identity;
mod message;
mod reducer;
mod roster;
mod sync;
mod transcript;
mod typing;

pub use error::IdentityError;
pub use handle::HandleId;
pub use identity::Identity;
pub use message::Message;
pub use reducer::Reducer;
pub use roster::Roster;
pub use sync::SyncState;
pub use transcript::Transcript;
pub use typing::TypingSet;
