//! Engine.IO / Socket.IO text packets.
//!
//! A WebSocket text frame holds exactly one Engine.IO packet: a single type
//! digit followed by its data. Engine.IO `message` packets (`4`) in turn
//! carry one Socket.IO packet, again a type digit followed by an optional
//! namespace, an optional ack id and a JSON body.
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,"pingTimeout":20000}   open
//! 2 / 3                                                     ping / pong
//! 40 / 40{"sid":".."}                                       socket.io connect
//! 42["message",{"name":"alice","text":"hi"}]                event
//! 44{"message":"not authorized"}                            connect error
//! ```
//!
//! Only the default namespace is used. A namespace prefix (`/chat,`) and an
//! ack id on inbound events are accepted and ignored, since the chat contract
//! has no acknowledgments.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ProtocolError, Result};

const EIO_OPEN: char = '0';
const EIO_CLOSE: char = '1';
const EIO_PING: char = '2';
const EIO_PONG: char = '3';
const EIO_MESSAGE: char = '4';
const EIO_NOOP: char = '6';

const SIO_CONNECT: char = '0';
const SIO_DISCONNECT: char = '1';
const SIO_EVENT: char = '2';
const SIO_CONNECT_ERROR: char = '4';

/// Engine.IO open handshake, sent by the server when a transport opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Engine.IO session id.
    pub sid: String,
    /// Transport upgrades offered (always empty over WebSocket).
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Interval between server pings, in milliseconds.
    pub ping_interval: u64,
    /// Grace period after a missed ping, in milliseconds.
    pub ping_timeout: u64,
    /// Largest payload the server accepts, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

impl Handshake {
    /// Longest silence tolerated before the link counts as dead.
    pub fn heartbeat_deadline(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

/// Socket.IO event: a name plus positional JSON arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPacket {
    /// Event name (first element of the JSON array).
    pub name: String,
    /// Remaining array elements.
    pub args: Vec<Value>,
}

impl EventPacket {
    /// Create an event with a single argument.
    pub fn new(name: impl Into<String>, arg: Value) -> Self {
        Self { name: name.into(), args: vec![arg] }
    }
}

/// A decoded text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Engine.IO open with handshake parameters.
    Open(Handshake),
    /// Engine.IO close.
    Close,
    /// Engine.IO ping (server to client in v4).
    Ping,
    /// Engine.IO pong.
    Pong,
    /// Engine.IO noop.
    Noop,
    /// Socket.IO namespace connect. The server's reply carries a `sid`.
    Connect {
        /// Socket.IO session id, present in the server's reply only.
        sid: Option<String>,
    },
    /// Socket.IO namespace disconnect.
    Disconnect,
    /// Socket.IO event.
    Event(EventPacket),
    /// Socket.IO connect refusal.
    ConnectError {
        /// Reason given by the server.
        message: String,
    },
}

#[derive(Serialize, Deserialize)]
struct ConnectBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sid: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct ConnectErrorBody {
    #[serde(default)]
    message: String,
}

impl Packet {
    /// Decode one WebSocket text frame.
    pub fn decode(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(ProtocolError::EmptyPacket)?;
        let rest = chars.as_str();

        match kind {
            EIO_OPEN => Ok(Self::Open(serde_json::from_str(rest)?)),
            EIO_CLOSE => Ok(Self::Close),
            // Ping/pong payloads only matter for transport upgrades
            EIO_PING => Ok(Self::Ping),
            EIO_PONG => Ok(Self::Pong),
            EIO_NOOP => Ok(Self::Noop),
            EIO_MESSAGE => Self::decode_message(rest),
            other => Err(ProtocolError::UnknownPacketType(other)),
        }
    }

    fn decode_message(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(ProtocolError::EmptyPacket)?;
        let body = strip_namespace(chars.as_str());

        match kind {
            SIO_CONNECT => {
                if body.is_empty() {
                    return Ok(Self::Connect { sid: None });
                }
                let reply: ConnectBody = serde_json::from_str(body)?;
                Ok(Self::Connect { sid: reply.sid })
            },
            SIO_DISCONNECT => Ok(Self::Disconnect),
            SIO_EVENT => Self::decode_event(strip_ack_id(body)),
            SIO_CONNECT_ERROR => {
                let error: ConnectErrorBody = serde_json::from_str(body)?;
                Ok(Self::ConnectError { message: error.message })
            },
            other => Err(ProtocolError::UnsupportedMessageType(other)),
        }
    }

    fn decode_event(body: &str) -> Result<Self> {
        let mut args: Vec<Value> = serde_json::from_str(body)?;
        if args.is_empty() {
            return Err(ProtocolError::MissingEventName);
        }

        match args.remove(0) {
            Value::String(name) => Ok(Self::Event(EventPacket { name, args })),
            _ => Err(ProtocolError::MissingEventName),
        }
    }

    /// Encode into the text of one WebSocket frame.
    pub fn encode(&self) -> Result<String> {
        let text = match self {
            Self::Open(handshake) => format!("{EIO_OPEN}{}", serde_json::to_string(handshake)?),
            Self::Close => EIO_CLOSE.to_string(),
            Self::Ping => EIO_PING.to_string(),
            Self::Pong => EIO_PONG.to_string(),
            Self::Noop => EIO_NOOP.to_string(),
            Self::Connect { sid: None } => format!("{EIO_MESSAGE}{SIO_CONNECT}"),
            Self::Connect { sid: Some(sid) } => {
                let body = serde_json::to_string(&ConnectBody { sid: Some(sid.clone()) })?;
                format!("{EIO_MESSAGE}{SIO_CONNECT}{body}")
            },
            Self::Disconnect => format!("{EIO_MESSAGE}{SIO_DISCONNECT}"),
            Self::Event(event) => {
                let mut array = Vec::with_capacity(event.args.len().saturating_add(1));
                array.push(Value::String(event.name.clone()));
                array.extend(event.args.iter().cloned());
                format!("{EIO_MESSAGE}{SIO_EVENT}{}", serde_json::to_string(&array)?)
            },
            Self::ConnectError { message } => {
                let body = serde_json::to_string(&ConnectErrorBody { message: message.clone() })?;
                format!("{EIO_MESSAGE}{SIO_CONNECT_ERROR}{body}")
            },
        };
        Ok(text)
    }
}

/// Drop a leading `/namespace,` if present.
fn strip_namespace(body: &str) -> &str {
    if !body.starts_with('/') {
        return body;
    }
    match body.find(',') {
        Some(idx) => &body[idx.saturating_add(1)..],
        None => "",
    }
}

/// Drop a leading numeric ack id if present.
fn strip_ack_id(body: &str) -> &str {
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_open_handshake() {
        let packet = Packet::decode(
            r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();

        let Packet::Open(handshake) = packet else { panic!("expected open packet") };
        assert_eq!(handshake.sid, "abc");
        assert_eq!(handshake.heartbeat_deadline(), std::time::Duration::from_secs(45));
    }

    #[test]
    fn decode_heartbeat_packets() {
        assert_eq!(Packet::decode("2").unwrap(), Packet::Ping);
        assert_eq!(Packet::decode("2probe").unwrap(), Packet::Ping);
        assert_eq!(Packet::decode("3").unwrap(), Packet::Pong);
        assert_eq!(Packet::decode("6").unwrap(), Packet::Noop);
        assert_eq!(Packet::decode("1").unwrap(), Packet::Close);
    }

    #[test]
    fn decode_connect_reply_with_sid() {
        let packet = Packet::decode(r#"40{"sid":"xyz"}"#).unwrap();
        assert_eq!(packet, Packet::Connect { sid: Some("xyz".into()) });
    }

    #[test]
    fn decode_event_ignores_namespace_and_ack_id() {
        let packet = Packet::decode(r#"42/chat,17["user_list",["alice","bob"]]"#).unwrap();
        let Packet::Event(event) = packet else { panic!("expected event") };
        assert_eq!(event.name, "user_list");
        assert_eq!(event.args, vec![json!(["alice", "bob"])]);
    }

    #[test]
    fn decode_connect_error() {
        let packet = Packet::decode(r#"44{"message":"nope"}"#).unwrap();
        assert_eq!(packet, Packet::ConnectError { message: "nope".into() });
    }

    #[test]
    fn decode_rejects_malformed_frames() {
        assert_eq!(Packet::decode(""), Err(ProtocolError::EmptyPacket));
        assert_eq!(Packet::decode("4"), Err(ProtocolError::EmptyPacket));
        assert_eq!(Packet::decode("9"), Err(ProtocolError::UnknownPacketType('9')));
        assert_eq!(Packet::decode("43[]"), Err(ProtocolError::UnsupportedMessageType('3')));
        assert_eq!(Packet::decode("42[]"), Err(ProtocolError::MissingEventName));
        assert_eq!(Packet::decode("42[1,2]"), Err(ProtocolError::MissingEventName));
        assert!(matches!(Packet::decode("42[oops"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn encode_client_packets() {
        insta::assert_snapshot!(Packet::Connect { sid: None }.encode().unwrap(), @"40");
        insta::assert_snapshot!(Packet::Pong.encode().unwrap(), @"3");

        let event = Packet::Event(EventPacket::new("typing", json!("alice")));
        insta::assert_snapshot!(event.encode().unwrap(), @r#"42["typing","alice"]"#);
    }

    #[test]
    fn encode_server_packets() {
        let reply = Packet::Connect { sid: Some("s1".into()) };
        insta::assert_snapshot!(reply.encode().unwrap(), @r#"40{"sid":"s1"}"#);

        let refusal = Packet::ConnectError { message: "full".into() };
        insta::assert_snapshot!(refusal.encode().unwrap(), @r#"44{"message":"full"}"#);
    }
}
