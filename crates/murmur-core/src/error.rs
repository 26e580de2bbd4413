//! Error types for the synchronization core.

use thiserror::Error;

/// A display name could not be used as a local identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Name was empty after trimming whitespace.
    #[error("display name must not be empty")]
    Empty,
}
