//! Application layer for murmur
//!
//! Pure state machines and a generic runtime for UI and session
//! orchestration, so deterministic simulation runs the same code as the
//! terminal client.
//!
//! # Components
//!
//! - [`App`]: UI state machine (composer, commands, theme, connection display)
//! - [`Bridge`]: Session bridge (translates App actions to Client events)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver
//! - [`View`]: Read-only projection handed to the renderer
//! - [`PreferenceStore`]: Where the display name and theme survive restarts

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod commands;
mod driver;
mod event;
mod input;
mod runtime;
mod state;
mod store;
mod view;

pub use action::AppAction;
pub use app::App;
pub use bridge::{Bridge, TransportCommand};
pub use commands::Command;
pub use driver::Driver;
pub use event::AppEvent;
pub use input::{InputState, KeyInput};
pub use runtime::Runtime;
pub use state::{ConnectionState, Theme};
pub use store::{FileStore, MemoryStore, PreferenceStore, Preferences, StoreError};
pub use view::View;
