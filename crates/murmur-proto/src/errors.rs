//! Protocol errors.

use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding wire packets.
///
/// Every variant is recoverable: a transport drops the offending packet and
/// keeps reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Text frame carried no packet type.
    #[error("empty packet")]
    EmptyPacket,

    /// Engine.IO packet type is not one we understand.
    #[error("unknown packet type {0:?}")]
    UnknownPacketType(char),

    /// Socket.IO packet type inside a message is not supported (acks, binary).
    #[error("unsupported socket.io packet type {0:?}")]
    UnsupportedMessageType(char),

    /// JSON body failed to parse or serialize.
    #[error("invalid json: {0}")]
    Json(String),

    /// Event packet did not start with a string event name.
    #[error("event packet has no name")]
    MissingEventName,

    /// Event name is not part of the chat contract.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Event arguments do not match the expected payload shape.
    #[error("invalid payload for {event}: {reason}")]
    InvalidPayload {
        /// Event name.
        event: String,
        /// What was wrong with the arguments.
        reason: String,
    },
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
