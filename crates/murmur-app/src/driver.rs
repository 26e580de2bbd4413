//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use murmur_client::TransportEvent;
use murmur_core::HandleId;
use murmur_proto::Intent;

use crate::{AppEvent, View};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in production TUI and simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, one WebSocket transport task per
///   handle
/// - **Simulation**: an in-memory room with injectable and late events
///
/// # Handles
///
/// The runtime opens at most one handle at a time and always closes the old
/// one first. Events a driver reports must be tagged with the handle whose
/// transport produced them; the runtime drops those of dead handles.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for the next input event.
    ///
    /// Returns `None` if no event arrived within the driver's tick.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Create the transport for a handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be started.
    fn open(&mut self, handle: HandleId) -> Result<(), Self::Error>;

    /// Destroy the transport of a handle. Unknown handles are ignored.
    fn close(&mut self, handle: HandleId);

    /// Send an intent on a handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport went away.
    fn emit(
        &mut self,
        handle: HandleId,
        intent: Intent,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Take the next transport event without waiting.
    ///
    /// Returns `None` if nothing is ready.
    fn recv_transport(&mut self) -> Option<(HandleId, TransportEvent)>;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, view: &View<'_>) -> Result<(), Self::Error>;

    /// Stop all transports and clean up resources.
    fn stop(&mut self);
}
