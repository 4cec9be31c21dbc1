//! Engine.IO v4 / Socket.IO v5 text framing, limited to what a websocket-only
//! client on the default namespace needs.
//!
//! An Engine.IO packet is a single type digit followed by its payload. Message
//! packets (`4`) carry a Socket.IO packet: another type digit, an optional
//! namespace (`/name,`), an optional ack id and a JSON payload.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Noop,
    Connect { sid: Option<String> },
    Disconnect,
    Event { name: String, data: Value },
    ConnectError { message: String },
}

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("empty packet")]
    Empty,
    #[error("unknown engine.io packet type {0:?}")]
    UnknownEngineType(char),
    #[error("unknown socket.io packet type {0:?}")]
    UnknownSocketType(char),
    #[error("unsupported socket.io packet type {0:?}")]
    Unsupported(char),
    #[error("malformed event payload")]
    MalformedEvent,
    #[error("invalid json payload: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn decode_packet(text: &str) -> Result<Packet, PacketError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(PacketError::Empty)?;
    let rest = chars.as_str();
    match kind {
        '0' => Ok(Packet::Open(serde_json::from_str(rest)?)),
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping),
        '3' => Ok(Packet::Pong),
        '4' => decode_socket_packet(rest),
        '6' => Ok(Packet::Noop),
        other => Err(PacketError::UnknownEngineType(other)),
    }
}

fn decode_socket_packet(text: &str) -> Result<Packet, PacketError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(PacketError::Empty)?;
    let body = strip_ack_id(strip_namespace(chars.as_str()));
    match kind {
        '0' => {
            let sid = if body.is_empty() {
                None
            } else {
                let value: Value = serde_json::from_str(body)?;
                value.get("sid").and_then(Value::as_str).map(ToOwned::to_owned)
            };
            Ok(Packet::Connect { sid })
        }
        '1' => Ok(Packet::Disconnect),
        '2' => {
            let value: Value = serde_json::from_str(body)?;
            let mut items = match value {
                Value::Array(items) => items.into_iter(),
                _ => return Err(PacketError::MalformedEvent),
            };
            let name = match items.next() {
                Some(Value::String(name)) => name,
                _ => return Err(PacketError::MalformedEvent),
            };
            let data = items.next().unwrap_or(Value::Null);
            Ok(Packet::Event { name, data })
        }
        '4' => {
            let value: Value = serde_json::from_str(body)?;
            let message = match value {
                Value::String(message) => message,
                other => other
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            };
            Ok(Packet::ConnectError { message })
        }
        '3' | '5' | '6' => Err(PacketError::Unsupported(kind)),
        other => Err(PacketError::UnknownSocketType(other)),
    }
}

/// Drops a `/namespace,` prefix; only the default namespace is used.
fn strip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.find(',') {
            Some(idx) => &body[idx + 1..],
            None => "",
        }
    } else {
        body
    }
}

fn strip_ack_id(body: &str) -> &str {
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

pub fn encode_packet(packet: &Packet) -> String {
    match packet {
        Packet::Open(handshake) => format!(
            "0{}",
            serde_json::json!({
                "sid": handshake.sid,
                "pingInterval": handshake.ping_interval,
                "pingTimeout": handshake.ping_timeout,
            })
        ),
        Packet::Close => "1".to_string(),
        Packet::Ping => "2".to_string(),
        Packet::Pong => "3".to_string(),
        Packet::Noop => "6".to_string(),
        Packet::Connect { sid: None } => "40".to_string(),
        Packet::Connect { sid: Some(sid) } => format!("40{}", serde_json::json!({ "sid": sid })),
        Packet::Disconnect => "41".to_string(),
        Packet::Event { name, data } => format!("42{}", serde_json::json!([name, data])),
        Packet::ConnectError { message } => {
            format!("44{}", serde_json::json!({ "message": message }))
        }
    }
}
