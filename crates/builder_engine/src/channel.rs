use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use builder_logging::{builder_debug, builder_info, builder_warn};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::packet::{decode_packet, encode_packet, Packet};

/// Fired after the namespace connect handshake completes, on every reconnect.
pub const CONNECT_EVENT: &str = "connect";
/// Fired when an established connection is lost.
pub const DISCONNECT_EVENT: &str = "disconnect";

pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("websocket error: {0}")]
    WebSocket(String),
    #[error("connection rejected: {0}")]
    Rejected(String),
    #[error("connection closed by server")]
    Closed,
    #[error("channel is not connected")]
    NotConnected,
}

#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub url: Url,
    pub reconnect_delay: Duration,
}

impl ChannelSettings {
    /// Websocket transport endpoint on the same host and port as `base_url`.
    pub fn for_server(base_url: &str) -> Result<Self, ChannelError> {
        let mut url =
            Url::parse(base_url).map_err(|err| ChannelError::InvalidUrl(err.to_string()))?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => return Err(ChannelError::InvalidUrl(format!("unsupported scheme {other}"))),
        };
        url.set_scheme(scheme)
            .map_err(|()| ChannelError::InvalidUrl(base_url.to_string()))?;
        url.set_path("/socket.io/");
        url.set_query(Some("EIO=4&transport=websocket"));
        url.set_fragment(None);
        Ok(Self {
            url,
            reconnect_delay: Duration::from_secs(2),
        })
    }
}

#[derive(Default)]
struct Shared {
    listeners: Mutex<HashMap<String, Vec<EventHandler>>>,
    session_id: Mutex<Option<String>>,
    outgoing: Mutex<Option<mpsc::UnboundedSender<String>>>,
}

/// Socket.IO client over a single websocket transport.
///
/// Cloning yields another handle onto the same connection and listener
/// registry.
#[derive(Clone)]
pub struct RealtimeChannel {
    settings: Arc<ChannelSettings>,
    shared: Arc<Shared>,
    shutdown: CancellationToken,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RealtimeChannel {
    pub fn new(settings: ChannelSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            shared: Arc::new(Shared::default()),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn settings(&self) -> &ChannelSettings {
        &self.settings
    }

    /// Adds a listener; listeners of one event run in registration order.
    pub fn on(&self, event: &str, handler: impl Fn(&Value) + Send + Sync + 'static) {
        lock(&self.shared.listeners)
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Removes every listener of `event`.
    pub fn off(&self, event: &str) {
        lock(&self.shared.listeners).remove(event);
    }

    pub fn listener_count(&self, event: &str) -> usize {
        lock(&self.shared.listeners)
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Socket.IO session id of the current connection.
    pub fn session_id(&self) -> Option<String> {
        lock(&self.shared.session_id).clone()
    }

    pub fn is_connected(&self) -> bool {
        self.session_id().is_some()
    }

    pub fn emit(&self, event: &str, data: Value) -> Result<(), ChannelError> {
        let packet = encode_packet(&Packet::Event {
            name: event.to_string(),
            data,
        });
        match lock(&self.shared.outgoing).as_ref() {
            Some(tx) => tx.send(packet).map_err(|_| ChannelError::NotConnected),
            None => Err(ChannelError::NotConnected),
        }
    }

    /// Stops the connection loop; no reconnect follows.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    /// Calls the listeners of `event` outside the registry lock, so a listener
    /// may itself call `on`/`off`.
    fn dispatch(&self, event: &str, data: &Value) {
        let handlers: Vec<EventHandler> = lock(&self.shared.listeners)
            .get(event)
            .cloned()
            .unwrap_or_default();
        for handler in handlers {
            handler(data);
        }
    }

    /// Connects, and reconnects after every loss, until `close` is called.
    pub async fn run(self) {
        loop {
            if self.shutdown.is_cancelled() {
                break;
            }
            match self.run_session().await {
                Ok(()) => {
                    builder_info!("Realtime channel closed");
                }
                Err(err) => {
                    builder_warn!("Realtime channel error: {}", err);
                }
            }
            self.end_session();
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.settings.reconnect_delay) => {}
            }
        }
    }

    async fn run_session(&self) -> Result<(), ChannelError> {
        builder_debug!("Connecting realtime channel to {}", self.settings.url);
        let (socket, _response) = tokio_tungstenite::connect_async(self.settings.url.as_str())
            .await
            .map_err(|err| ChannelError::WebSocket(err.to_string()))?;
        let (mut sink, mut stream) = socket.split();

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        *lock(&self.shared.outgoing) = Some(out_tx.clone());
        let mut engine_sid = None;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    let _ = sink.send(Message::Text(encode_packet(&Packet::Disconnect).into())).await;
                    let _ = sink.close().await;
                    return Ok(());
                }
                Some(text) = out_rx.recv() => {
                    sink.send(Message::Text(text.into()))
                        .await
                        .map_err(|err| ChannelError::WebSocket(err.to_string()))?;
                }
                incoming = stream.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        self.handle_text(text.as_str(), &out_tx, &mut engine_sid)?
                    },
                    Some(Ok(Message::Close(_))) | None => return Err(ChannelError::Closed),
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(ChannelError::WebSocket(err.to_string())),
                },
            }
        }
    }

    fn handle_text(
        &self,
        text: &str,
        out_tx: &mpsc::UnboundedSender<String>,
        engine_sid: &mut Option<String>,
    ) -> Result<(), ChannelError> {
        let packet = match decode_packet(text) {
            Ok(packet) => packet,
            Err(err) => {
                builder_warn!("Ignoring realtime packet {:?}: {}", text, err);
                return Ok(());
            }
        };
        let reply = |packet: Packet| {
            out_tx
                .send(encode_packet(&packet))
                .map_err(|_| ChannelError::NotConnected)
        };

        match packet {
            Packet::Open(handshake) => {
                builder_debug!(
                    "Engine.IO session {} opened (ping interval {} ms)",
                    handshake.sid,
                    handshake.ping_interval
                );
                *engine_sid = Some(handshake.sid);
                reply(Packet::Connect { sid: None })?;
            }
            Packet::Ping => reply(Packet::Pong)?,
            Packet::Connect { sid } => {
                // Older servers omit the namespace sid; fall back to the transport one.
                let sid = sid.or_else(|| engine_sid.clone());
                builder_info!("Realtime channel connected (sid={:?})", sid);
                *lock(&self.shared.session_id) = sid;
                self.dispatch(CONNECT_EVENT, &Value::Null);
            }
            Packet::Event { name, data } => self.dispatch(&name, &data),
            Packet::ConnectError { message } => return Err(ChannelError::Rejected(message)),
            Packet::Disconnect | Packet::Close => return Err(ChannelError::Closed),
            Packet::Pong | Packet::Noop => {}
        }
        Ok(())
    }

    fn end_session(&self) {
        *lock(&self.shared.outgoing) = None;
        let was_connected = lock(&self.shared.session_id).take().is_some();
        if was_connected {
            self.dispatch(DISCONNECT_EVENT, &Value::Null);
        }
    }
}
