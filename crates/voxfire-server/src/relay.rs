//! Relay state: connection id → last reported pose.
//!
//! The relay simulates nothing. Every event it sees turns into zero or more
//! outbound messages, each with a recipient set, which the hub delivers. No
//! message is ever echoed to its sender except `playerHit`.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use voxfire_net::{
    BulletShot, ClientMessage, ConnectionId, PlayerSnapshot, PlayerState, ServerEvent,
    ServerMessage, Welcome,
};

/// Who receives an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipients {
    Only(ConnectionId),
    AllExcept(ConnectionId),
    All,
}

/// A message and its recipients.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: Recipients,
    pub message: ServerMessage,
}

impl Outbound {
    fn only(id: ConnectionId, message: ServerMessage) -> Self {
        Self {
            to: Recipients::Only(id),
            message,
        }
    }

    fn all_except(id: ConnectionId, message: ServerMessage) -> Self {
        Self {
            to: Recipients::AllExcept(id),
            message,
        }
    }
}

#[derive(Debug, Default)]
pub struct Relay {
    players: FxHashMap<ConnectionId, PlayerState>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch one transport event.
    pub fn handle(&mut self, event: ServerEvent) -> Vec<Outbound> {
        match event {
            ServerEvent::Connected { id } => self.on_connect(id),
            ServerEvent::Message { id, message } => self.on_message(id, message),
            ServerEvent::Disconnected { id } => self.on_disconnect(id),
        }
    }

    /// Register a connection: tell it its id and everyone present, and
    /// announce it to the others.
    pub fn on_connect(&mut self, id: ConnectionId) -> Vec<Outbound> {
        let state = PlayerState::INITIAL;
        self.players.insert(id, state);

        let current: BTreeMap<_, _> = self.players.iter().map(|(k, v)| (*k, *v)).collect();
        tracing::info!("Player {id} joined ({} connected)", self.players.len());

        vec![
            Outbound::only(id, ServerMessage::Welcome(Welcome { id })),
            Outbound::only(id, ServerMessage::CurrentPlayers(current)),
            Outbound::all_except(id, ServerMessage::NewPlayer(PlayerSnapshot::new(id, state))),
        ]
    }

    /// Relay a message from `id`.
    pub fn on_message(&mut self, id: ConnectionId, message: ClientMessage) -> Vec<Outbound> {
        match message {
            ClientMessage::PlayerMovement(movement) => {
                let Some(state) = self.players.get_mut(&id) else {
                    tracing::debug!("Movement from unknown connection {id} ignored");
                    return Vec::new();
                };
                state.position = movement.position;
                state.rotation = movement.rotation;
                let snapshot = PlayerSnapshot::new(id, *state);
                vec![Outbound::all_except(id, ServerMessage::PlayerMoved(snapshot))]
            }
            ClientMessage::ShootBullet(shot) => {
                if shot.id != id {
                    tracing::debug!("Shot from {id} claimed shooter {}, rewritten", shot.id);
                }
                let shot = BulletShot { id, ..shot };
                vec![Outbound::all_except(id, ServerMessage::BulletFired(shot))]
            }
            ClientMessage::PlayerHit(hit) => {
                tracing::debug!(
                    "{id} reports {} hit by {}",
                    hit.hit_player_id,
                    hit.shooter_id
                );
                vec![Outbound {
                    to: Recipients::All,
                    message: ServerMessage::PlayerHit(hit),
                }]
            }
        }
    }

    /// Forget a connection and announce its departure.
    pub fn on_disconnect(&mut self, id: ConnectionId) -> Vec<Outbound> {
        if self.players.remove(&id).is_none() {
            return Vec::new();
        }
        tracing::info!("Player {id} left ({} connected)", self.players.len());
        vec![Outbound::all_except(id, ServerMessage::PlayerDisconnected(id))]
    }

    pub fn player(&self, id: ConnectionId) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
