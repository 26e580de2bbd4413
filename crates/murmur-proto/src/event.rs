//! Chat events carried by Socket.IO event packets.
//!
//! The chat contract is small and fixed. Clients emit four intents and the
//! server pushes three events; nothing else is defined (no acknowledgments,
//! no error events, no message ids).
//!
//! | Direction | Name          | Argument                                  |
//! |-----------|---------------|-------------------------------------------|
//! | out       | `join`        | `{ "username": string }`                  |
//! | out       | `message`     | `{ "name": string, "text": string }`      |
//! | out       | `typing`      | `string`                                  |
//! | out       | `stop_typing` | `string`                                  |
//! | in        | `message`     | `{ "name", "text", "time" }` (strings)    |
//! | in        | `user_list`   | `[string]`                                |
//! | in        | `typing`      | `[string]`                                |

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    EventPacket, Packet,
    errors::{ProtocolError, Result},
};

const JOIN: &str = "join";
const MESSAGE: &str = "message";
const TYPING: &str = "typing";
const STOP_TYPING: &str = "stop_typing";
const USER_LIST: &str = "user_list";

/// Outbound event, client to server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Announce a participant to the room.
    Join {
        /// Self-asserted display name.
        username: String,
    },
    /// Post a message to the room.
    Message {
        /// Sender's display name.
        name: String,
        /// Message body, verbatim.
        text: String,
    },
    /// The named participant pressed a key in the composer.
    Typing(String),
    /// The named participant stopped composing.
    StopTyping(String),
}

#[derive(Serialize, Deserialize)]
struct JoinBody {
    username: String,
}

#[derive(Serialize, Deserialize)]
struct MessageBody {
    name: String,
    text: String,
}

impl Intent {
    /// Socket.IO event name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => JOIN,
            Self::Message { .. } => MESSAGE,
            Self::Typing(_) => TYPING,
            Self::StopTyping(_) => STOP_TYPING,
        }
    }

    /// Wrap in a Socket.IO event packet.
    pub fn into_packet(self) -> Result<Packet> {
        let event_name = self.name();
        let arg = match self {
            Self::Join { username } => serde_json::to_value(JoinBody { username })?,
            Self::Message { name, text } => serde_json::to_value(MessageBody { name, text })?,
            Self::Typing(username) | Self::StopTyping(username) => {
                serde_json::Value::String(username)
            },
        };
        Ok(Packet::Event(EventPacket::new(event_name, arg)))
    }

    /// Parse an event packet sent by a client.
    pub fn from_packet(event: EventPacket) -> Result<Self> {
        match event.name.as_str() {
            JOIN => payload::<JoinBody>(event).map(|body| Self::Join { username: body.username }),
            MESSAGE => payload::<MessageBody>(event)
                .map(|body| Self::Message { name: body.name, text: body.text }),
            TYPING => payload::<String>(event).map(Self::Typing),
            STOP_TYPING => payload::<String>(event).map(Self::StopTyping),
            _ => Err(ProtocolError::UnknownEvent(event.name)),
        }
    }
}

/// A message as broadcast by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender's display name, as asserted by the sender.
    pub name: String,
    /// Message body.
    pub text: String,
    /// Server-side timestamp, opaque to the client.
    pub time: String,
}

/// Inbound event, server to client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// A message to append to the transcript.
    Message(ChatMessage),
    /// Complete list of connected participants.
    UserList(Vec<String>),
    /// Complete list of participants currently typing.
    Typing(Vec<String>),
}

impl ServerEvent {
    /// Socket.IO event name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Message(_) => MESSAGE,
            Self::UserList(_) => USER_LIST,
            Self::Typing(_) => TYPING,
        }
    }

    /// Wrap in a Socket.IO event packet.
    pub fn into_packet(self) -> Result<Packet> {
        let event_name = self.name();
        let arg = match self {
            Self::Message(message) => serde_json::to_value(message)?,
            Self::UserList(names) | Self::Typing(names) => serde_json::to_value(names)?,
        };
        Ok(Packet::Event(EventPacket::new(event_name, arg)))
    }

    /// Parse an event packet sent by the server.
    pub fn from_packet(event: EventPacket) -> Result<Self> {
        match event.name.as_str() {
            MESSAGE => payload::<ChatMessage>(event).map(Self::Message),
            USER_LIST => payload::<Vec<String>>(event).map(Self::UserList),
            TYPING => payload::<Vec<String>>(event).map(Self::Typing),
            _ => Err(ProtocolError::UnknownEvent(event.name)),
        }
    }
}

/// Deserialize the first argument of an event.
fn payload<T: DeserializeOwned>(event: EventPacket) -> Result<T> {
    let EventPacket { name, args } = event;
    let Some(arg) = args.into_iter().next() else {
        return Err(ProtocolError::InvalidPayload { event: name, reason: "missing argument".into() });
    };
    serde_json::from_value(arg)
        .map_err(|err| ProtocolError::InvalidPayload { event: name, reason: err.to_string() })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn encode(packet: Packet) -> String {
        packet.encode().unwrap()
    }

    #[test]
    fn intents_encode_to_socketio_events() {
        let join = Intent::Join { username: "alice".into() };
        insta::assert_snapshot!(encode(join.into_packet().unwrap()), @r#"42["join",{"username":"alice"}]"#);

        let message = Intent::Message { name: "alice".into(), text: " hi ".into() };
        insta::assert_snapshot!(encode(message.into_packet().unwrap()), @r#"42["message",{"name":"alice","text":" hi "}]"#);

        let stop = Intent::StopTyping("alice".into());
        insta::assert_snapshot!(encode(stop.into_packet().unwrap()), @r#"42["stop_typing","alice"]"#);
    }

    #[test]
    fn server_message_decodes() {
        let packet = Packet::decode(r#"42["message",{"name":"bob","text":"yo","time":"12:00:01"}]"#)
            .unwrap();
        let Packet::Event(event) = packet else { panic!("expected event") };

        let decoded = ServerEvent::from_packet(event).unwrap();
        assert_eq!(
            decoded,
            ServerEvent::Message(ChatMessage {
                name: "bob".into(),
                text: "yo".into(),
                time: "12:00:01".into(),
            })
        );
    }

    #[test]
    fn server_lists_decode() {
        let roster = EventPacket::new("user_list", json!(["alice", "bob"]));
        assert_eq!(
            ServerEvent::from_packet(roster).unwrap(),
            ServerEvent::UserList(vec!["alice".into(), "bob".into()])
        );

        let typing = EventPacket::new("typing", json!([]));
        assert_eq!(ServerEvent::from_packet(typing).unwrap(), ServerEvent::Typing(vec![]));
    }

    #[test]
    fn unknown_server_event_is_rejected() {
        let history = EventPacket::new("history", json!([]));
        assert_eq!(
            ServerEvent::from_packet(history),
            Err(ProtocolError::UnknownEvent("history".into()))
        );
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        let missing = EventPacket { name: "user_list".into(), args: vec![] };
        assert!(matches!(
            ServerEvent::from_packet(missing),
            Err(ProtocolError::InvalidPayload { ref event, .. }) if event == "user_list"
        ));

        let wrong_shape = EventPacket::new("message", json!("just text"));
        assert!(matches!(
            ServerEvent::from_packet(wrong_shape),
            Err(ProtocolError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn client_intents_decode() {
        let typing = EventPacket::new("typing", json!("carol"));
        assert_eq!(Intent::from_packet(typing).unwrap(), Intent::Typing("carol".into()));

        let join = EventPacket::new("join", json!({ "username": "carol" }));
        assert_eq!(Intent::from_packet(join).unwrap(), Intent::Join { username: "carol".into() });
    }
}
