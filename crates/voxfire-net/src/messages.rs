//! Relay message types and serialization.
//!
//! Messages are JSON objects of the form `{"event": "<name>", "data": <payload>}`.
//! On the wire each message is prefixed with a protocol version byte. Use
//! [`serialize_message`] and [`deserialize_message`] for encoding/decoding.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Current wire-protocol version. Prepended to every serialized message.
pub const PROTOCOL_VERSION: u8 = 1;

/// Relay-assigned identifier of one client connection.
///
/// Ids are allocated monotonically from 1 and never reused within a server run,
/// so ascending id order is join order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Payload structs
// ---------------------------------------------------------------------------

/// Plain `{x, y, z}` vector as it appears on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WireVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WireVec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for WireVec3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<WireVec3> for Vec3 {
    fn from(v: WireVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// Heading only. Pitch is camera-local and never synchronized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Yaw in radians.
    pub y: f32,
}

/// Last-known pose of one connection, as held by the relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: WireVec3,
    pub rotation: Rotation,
}

impl PlayerState {
    /// Record given to every new connection before its first movement.
    pub const INITIAL: Self = Self {
        position: WireVec3::new(0.0, 1.5, 0.0),
        rotation: Rotation { y: 0.0 },
    };
}

/// Client movement report (`playerMovement`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerMovement {
    pub position: WireVec3,
    pub rotation: Rotation,
}

/// A shot, sent as `shootBullet` and relayed as `bulletFired`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletShot {
    /// Shooter. Overwritten by the relay with the sender's id.
    pub id: ConnectionId,
    pub origin: WireVec3,
    pub direction: WireVec3,
}

/// Client-judged hit report, relayed unchanged to every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerHit {
    pub hit_player_id: ConnectionId,
    pub shooter_id: ConnectionId,
}

/// Pose of one peer (`newPlayer`, `playerMoved`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: ConnectionId,
    pub position: WireVec3,
    pub rotation: Rotation,
}

impl PlayerSnapshot {
    pub fn new(id: ConnectionId, state: PlayerState) -> Self {
        Self {
            id,
            position: state.position,
            rotation: state.rotation,
        }
    }
}

/// Handshake telling a fresh connection its own id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Welcome {
    pub id: ConnectionId,
}

// ---------------------------------------------------------------------------
// Top-level enums
// ---------------------------------------------------------------------------

/// Messages a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    PlayerMovement(PlayerMovement),
    ShootBullet(BulletShot),
    PlayerHit(PlayerHit),
}

/// Messages the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    Welcome(Welcome),
    /// Every known connection, including the recipient.
    CurrentPlayers(BTreeMap<ConnectionId, PlayerState>),
    NewPlayer(PlayerSnapshot),
    PlayerMoved(PlayerSnapshot),
    BulletFired(BulletShot),
    PlayerHit(PlayerHit),
    PlayerDisconnected(ConnectionId),
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during message deserialization.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("empty payload, no version byte")]
    EmptyPayload,

    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Serialization helpers
// ---------------------------------------------------------------------------

/// Serialize a message into a versioned payload.
///
/// Wire format: `[version: u8] [JSON]`
pub fn serialize_message<T: Serialize>(msg: &T) -> Result<Vec<u8>, MessageError> {
    let mut out = vec![PROTOCOL_VERSION];
    serde_json::to_writer(&mut out, msg)?;
    Ok(out)
}

/// Deserialize a versioned payload.
///
/// Returns an error if the version is unsupported or the JSON is malformed.
pub fn deserialize_message<T: DeserializeOwned>(data: &[u8]) -> Result<T, MessageError> {
    let Some((&version, body)) = data.split_first() else {
        return Err(MessageError::EmptyPayload);
    };
    if version != PROTOCOL_VERSION {
        return Err(MessageError::UnsupportedVersion(version));
    }
    Ok(serde_json::from_slice(body)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
