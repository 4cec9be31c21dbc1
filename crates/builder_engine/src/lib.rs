//! Builder engine: build endpoint client, realtime channel and effect execution.
mod channel;
mod client;
mod engine;
mod packet;
mod types;

pub use channel::{
    ChannelError, ChannelSettings, EventHandler, RealtimeChannel, CONNECT_EVENT, DISCONNECT_EVENT,
};
pub use client::{BuildClient, BuildSettings, ReqwestBuildClient, BUILD_ENDPOINT};
pub use engine::EngineHandle;
pub use packet::{decode_packet, encode_packet, Handshake, Packet, PacketError};
pub use types::{BuildError, BuildResponse, EngineEvent, FailureKind, FormPart, FormPayload};
