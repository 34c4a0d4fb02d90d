//! Relay networking: wire messages, the versioned JSON codec, length-prefixed
//! framing, and the TCP server/client transports.

pub mod framing;
pub mod messages;
pub mod tcp_client;
pub mod tcp_server;

pub use framing::{FrameConfig, FrameError, read_frame, write_frame};
pub use messages::{
    BulletShot, ClientMessage, ConnectionId, MessageError, PROTOCOL_VERSION, PlayerHit,
    PlayerMovement, PlayerSnapshot, PlayerState, Rotation, ServerMessage, Welcome, WireVec3,
    deserialize_message, serialize_message,
};
pub use tcp_client::{ConnectionState, ConnectionStateWatch, GameClient};
pub use tcp_server::{
    ConnectionLimitReached, ConnectionMap, GameServer, IdGenerator, ServerConfig, ServerEvent,
};
