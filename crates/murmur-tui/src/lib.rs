//! Terminal UI for murmur
//!
//! A thin shell over [`murmur_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`murmur_app::Runtime`].
//!
//! This crate only handles terminal events, transports and rendering.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod terminal;
pub mod ui;

pub use murmur_app::{App, AppAction, AppEvent, Bridge, Driver, KeyInput, Runtime, View};
pub use terminal::{Connection, TerminalDriver, TerminalError};
