//! WebSocket transport for the client.
//!
//! Provides [`ConnectedClient`], which runs the link of one
//! connection-handle in a background task: the Engine.IO open, the Socket.IO
//! namespace connect, heartbeat replies and bounded reconnection. Protocol
//! logic remains in the Sans-IO [`Client`](crate::Client).
//!
//! The intent channel is drained even while the link is down. Those intents
//! wait in a bounded [`Backlog`] and are flushed in order once the link comes
//! back, so a stalled server never blocks the sender.

use std::{collections::VecDeque, time::Duration};

use futures::{Sink, SinkExt, StreamExt};
use murmur_proto::{Handshake, Intent, Packet, ProtocolError, ServerEvent};
use rand::Rng;
use thiserror::Error;
use tokio::{
    net::TcpStream,
    sync::mpsc::{self, error::TrySendError},
    time::{self, Instant},
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream,
    tungstenite::{self, Message},
};
use tracing::{debug, info, warn};

use crate::{TransportConfig, TransportEvent};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const SOCKET_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Server URL could not be mapped to a WebSocket endpoint.
    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Engine.IO or Socket.IO handshake failed.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// Stream error.
    #[error("stream error: {0}")]
    Stream(String),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Nothing arrived within the deadline.
    #[error("no traffic for {0:?}")]
    Timeout(Duration),
}

/// Handle to the background task serving one connection-handle.
///
/// Intents are sent and notifications received via the channels; the task
/// owns the socket.
pub struct ConnectedClient {
    /// Send intents to the server.
    pub to_server: mpsc::Sender<Intent>,
    /// Receive link notifications and server events.
    pub from_server: mpsc::Receiver<TransportEvent>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedClient {
    /// Stop the connection.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }

    /// Queue an intent without waiting.
    ///
    /// Returns `false` if the intent was dropped: the queue is full, or the
    /// task has stopped (retries exhausted or the URL was rejected). Delivery
    /// is best-effort either way.
    pub fn offer(&self, intent: Intent) -> bool {
        match self.to_server.try_send(intent) {
            Ok(()) => true,
            Err(TrySendError::Full(intent)) => {
                warn!(event = intent.name(), "intent queue full, dropping");
                false
            },
            Err(TrySendError::Closed(intent)) => {
                debug!(event = intent.name(), "transport stopped, dropping");
                false
            },
        }
    }
}

/// Intents held while the link is down.
///
/// Typing levels coalesce to the latest one and a newer `join` replaces an
/// older one. Once `capacity` is reached, further messages are dropped.
#[derive(Debug)]
struct Backlog {
    intents: VecDeque<Intent>,
    capacity: usize,
}

impl Backlog {
    fn new(capacity: usize) -> Self {
        Self { intents: VecDeque::new(), capacity: capacity.max(1) }
    }

    fn push(&mut self, intent: Intent) {
        match &intent {
            Intent::Typing(_) | Intent::StopTyping(_) => {
                self.intents
                    .retain(|queued| !matches!(queued, Intent::Typing(_) | Intent::StopTyping(_)));
            },
            Intent::Join { .. } => {
                self.intents.retain(|queued| !matches!(queued, Intent::Join { .. }));
            },
            Intent::Message { .. } if self.intents.len() >= self.capacity => {
                warn!(capacity = self.capacity, "backlog full, dropping message");
                return;
            },
            Intent::Message { .. } => {},
        }
        self.intents.push_back(intent);
    }

    fn take(&mut self) -> Vec<Intent> {
        self.intents.drain(..).collect()
    }
}

/// Run `work` while the link is down, moving intents into the backlog.
///
/// `None` means the caller went away.
async fn while_down<F: Future>(
    work: F,
    intents: &mut mpsc::Receiver<Intent>,
    backlog: &mut Backlog,
) -> Option<F::Output> {
    tokio::pin!(work);
    loop {
        tokio::select! {
            output = &mut work => return Some(output),
            intent = intents.recv() => match intent {
                Some(intent) => backlog.push(intent),
                None => return None,
            },
        }
    }
}

/// Start a connection task. Must be called within a tokio runtime.
///
/// Returns immediately; the link comes up in the background and reports
/// [`TransportEvent::Connected`] once the server accepts the namespace
/// connect.
pub fn spawn(config: TransportConfig) -> ConnectedClient {
    let capacity = config.channel_capacity.max(1);
    let (to_server_tx, to_server_rx) = mpsc::channel::<Intent>(capacity);
    let (from_server_tx, from_server_rx) = mpsc::channel::<TransportEvent>(capacity);

    let handle = tokio::spawn(run_connection(config, to_server_rx, from_server_tx));

    ConnectedClient {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
    }
}

/// Map a server base URL to its Engine.IO WebSocket endpoint.
///
/// `http://` becomes `ws://` and `https://` becomes `wss://`; a bare host is
/// treated as `ws://`.
pub fn socket_url(base: &str) -> Result<String, TransportError> {
    let base = base.trim().trim_end_matches('/');
    let (scheme, rest) = match base.split_once("://") {
        Some(("http" | "ws", rest)) => ("ws", rest),
        Some(("https" | "wss", rest)) => ("wss", rest),
        Some((other, _)) => {
            return Err(TransportError::InvalidUrl(format!("unsupported scheme: {other}")));
        },
        None => ("ws", base),
    };
    if rest.is_empty() {
        return Err(TransportError::InvalidUrl("missing host".into()));
    }
    Ok(format!("{scheme}://{rest}{SOCKET_PATH}"))
}

/// Keep a link alive until the caller goes away or retries run out.
async fn run_connection(
    config: TransportConfig,
    mut intents: mpsc::Receiver<Intent>,
    events: mpsc::Sender<TransportEvent>,
) {
    let url = match socket_url(&config.server) {
        Ok(url) => url,
        Err(err) => {
            let _ = events.send(TransportEvent::Failed { reason: err.to_string() }).await;
            return;
        },
    };

    let mut backlog = Backlog::new(config.channel_capacity);
    let mut failures: u32 = 0;
    loop {
        let attempt = time::timeout(config.connect_timeout, open_link(&url));
        let Some(attempt) = while_down(attempt, &mut intents, &mut backlog).await else {
            return;
        };

        let reason = match attempt {
            Ok(Ok((socket, handshake))) => {
                failures = 0;
                info!(%url, sid = %handshake.sid, "link open");
                if events.send(TransportEvent::Connected).await.is_err() {
                    return;
                }

                let held = backlog.take();
                match pump(socket, handshake.heartbeat_deadline(), held, &mut intents, &events).await
                {
                    Ok(()) => return,
                    Err(err) => {
                        let reason = err.to_string();
                        warn!(%reason, "link dropped");
                        let dropped = TransportEvent::Disconnected { reason: reason.clone() };
                        if events.send(dropped).await.is_err() {
                            return;
                        }
                        reason
                    },
                }
            },
            Ok(Err(err)) => err.to_string(),
            Err(_) => TransportError::Timeout(config.connect_timeout).to_string(),
        };

        failures = failures.saturating_add(1);
        let Some(delay) = config.reconnect.backoff(failures) else {
            warn!(%reason, attempts = failures, "giving up on link");
            let _ = events.send(TransportEvent::Failed { reason }).await;
            return;
        };
        if events.is_closed() {
            return;
        }

        let delay = config.reconnect.jittered(delay, rand::thread_rng().gen_range(0.0..1.0));
        debug!(attempt = failures, ?delay, %reason, "reconnecting");
        if while_down(time::sleep(delay), &mut intents, &mut backlog).await.is_none() {
            return;
        }
    }
}

/// Upgrade to WebSocket and complete both handshakes.
async fn open_link(url: &str) -> Result<(Socket, Handshake), TransportError> {
    let (mut socket, _response) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| TransportError::Connection(e.to_string()))?;

    let handshake = match next_packet(&mut socket).await? {
        Packet::Open(handshake) => handshake,
        other => {
            return Err(TransportError::Handshake(format!("expected open, got {other:?}")));
        },
    };

    send_packet(&mut socket, &Packet::Connect { sid: None }).await?;

    loop {
        match next_packet(&mut socket).await? {
            Packet::Connect { sid } => {
                debug!(?sid, "namespace connected");
                return Ok((socket, handshake));
            },
            Packet::ConnectError { message } => return Err(TransportError::Handshake(message)),
            Packet::Ping => send_packet(&mut socket, &Packet::Pong).await?,
            Packet::Noop => {},
            other => {
                return Err(TransportError::Handshake(format!("unexpected {other:?}")));
            },
        }
    }
}

/// Next Engine.IO packet, skipping WebSocket control frames.
async fn next_packet(socket: &mut Socket) -> Result<Packet, TransportError> {
    loop {
        let frame = socket
            .next()
            .await
            .ok_or_else(|| TransportError::Stream("connection closed".into()))?
            .map_err(|e| TransportError::Stream(e.to_string()))?;

        match frame {
            Message::Text(text) => return Ok(Packet::decode(text.as_str())?),
            Message::Close(_) => return Err(TransportError::Stream("closed by server".into())),
            _ => {},
        }
    }
}

async fn send_packet<S>(sink: &mut S, packet: &Packet) -> Result<(), TransportError>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    sink.send(Message::text(packet.encode()?))
        .await
        .map_err(|e| TransportError::Stream(format!("write failed: {e}")))
}

/// Flush `held`, then bridge channels and socket until the link drops.
///
/// `Ok(())` means the caller went away and the task should end.
async fn pump(
    socket: Socket,
    deadline: Duration,
    held: Vec<Intent>,
    intents: &mut mpsc::Receiver<Intent>,
    events: &mpsc::Sender<TransportEvent>,
) -> Result<(), TransportError> {
    let (mut sink, mut stream) = socket.split();
    for intent in held {
        debug!(event = intent.name(), "flush");
        send_packet(&mut sink, &intent.into_packet()?).await?;
    }
    let idle = time::sleep(deadline);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            () = &mut idle => return Err(TransportError::Timeout(deadline)),
            frame = stream.next() => {
                idle.as_mut().reset(Instant::now() + deadline);
                let frame = frame
                    .ok_or_else(|| TransportError::Stream("connection closed".into()))?
                    .map_err(|e| TransportError::Stream(e.to_string()))?;

                let text = match frame {
                    Message::Text(text) => text,
                    Message::Close(_) => {
                        return Err(TransportError::Stream("closed by server".into()));
                    },
                    _ => continue,
                };

                match Packet::decode(text.as_str()) {
                    Ok(Packet::Ping) => send_packet(&mut sink, &Packet::Pong).await?,
                    Ok(Packet::Event(event)) => match ServerEvent::from_packet(event) {
                        Ok(event) => {
                            if events.send(TransportEvent::Received(event)).await.is_err() {
                                return Ok(());
                            }
                        },
                        Err(ProtocolError::UnknownEvent(name)) => {
                            debug!(%name, "ignoring unknown event");
                        },
                        Err(err) => warn!(%err, "dropping malformed event"),
                    },
                    Ok(Packet::Close | Packet::Disconnect) => {
                        return Err(TransportError::Stream("server ended the session".into()));
                    },
                    Ok(packet) => debug!(?packet, "ignoring packet"),
                    Err(err) => warn!(%err, "undecodable frame"),
                }
            },
            intent = intents.recv() => {
                let Some(intent) = intent else {
                    let _ = send_packet(&mut sink, &Packet::Disconnect).await;
                    return Ok(());
                };
                debug!(event = intent.name(), "emit");
                send_packet(&mut sink, &intent.into_packet()?).await?;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_maps_to_ws() {
        assert_eq!(
            socket_url("http://localhost:5000/").unwrap(),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn https_maps_to_wss() {
        assert_eq!(
            socket_url("https://chat.example.org").unwrap(),
            "wss://chat.example.org/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn bare_host_defaults_to_ws() {
        assert_eq!(
            socket_url("127.0.0.1:5000").unwrap(),
            "ws://127.0.0.1:5000/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn unsupported_urls_rejected() {
        assert!(matches!(socket_url("ftp://host"), Err(TransportError::InvalidUrl(_))));
        assert!(matches!(socket_url("http://"), Err(TransportError::InvalidUrl(_))));
    }

    fn say(text: &str) -> Intent {
        Intent::Message { name: "alice".into(), text: text.into() }
    }

    #[test]
    fn backlog_coalesces_typing_and_join() {
        let mut backlog = Backlog::new(8);
        backlog.push(Intent::Join { username: "alice".into() });
        for _ in 0..100 {
            backlog.push(Intent::Typing("alice".into()));
        }
        backlog.push(say("hi"));
        backlog.push(Intent::StopTyping("alice".into()));
        backlog.push(Intent::Join { username: "alice".into() });

        assert_eq!(
            backlog.take(),
            vec![
                say("hi"),
                Intent::StopTyping("alice".into()),
                Intent::Join { username: "alice".into() },
            ]
        );
        assert!(backlog.take().is_empty());
    }

    #[test]
    fn full_backlog_drops_messages_but_keeps_levels() {
        let mut backlog = Backlog::new(2);
        backlog.push(say("one"));
        backlog.push(say("two"));
        backlog.push(say("three"));
        backlog.push(Intent::Typing("alice".into()));

        assert_eq!(backlog.take(), vec![say("one"), say("two"), Intent::Typing("alice".into())]);
    }
}
