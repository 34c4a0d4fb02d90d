//! Per-client game session.
//!
//! [`ClientSession`] owns the local controller, the remote registry, the
//! projectile lists, lives and loadout. It consumes [`ServerMessage`]s, runs
//! one frame per [`ClientSession::tick`], and queues [`ClientMessage`]s for
//! whatever transport is attached. It never touches a socket.

use glam::{Vec2, Vec3};
use voxfire_config::{CombatConfig, Config};
use voxfire_net::{ClientMessage, ConnectionId, ServerMessage};
use voxfire_physics::{ControllerInput, LocalPlayer, MovementIntent, avatar_center};
use voxfire_voxel::BlockQuery;

use crate::health::{HitOutcome, Lives};
use crate::loadout::Loadout;
use crate::projectile::ProjectileSystem;
use crate::remote_players::RemotePlayerRegistry;
use crate::scene::{AvatarLoadError, ProxyHandle, Scene};
use crate::wire;

/// Input sampled for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub intent: MovementIntent,
    /// Pointer motion since the last frame.
    pub look_delta: Vec2,
    /// `false` while pointer lock is released.
    pub accepting_input: bool,
    /// Fire button pressed this frame.
    pub fire: bool,
    /// Direct weapon slot selection (number keys).
    pub select_slot: Option<usize>,
    /// Scroll wheel delta; only the sign matters.
    pub weapon_scroll: i32,
}

/// Notifications for the UI and audio layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    /// The local player fired.
    Fired,
    /// The local player lost a life.
    Damaged {
        shooter: ConnectionId,
        lives_left: u32,
    },
    /// The local player lost the last life. Emitted once per session.
    Eliminated { shooter: ConnectionId },
    /// All state was reset; the transport should reconnect.
    SessionReset,
}

/// Everything one client simulates.
pub struct ClientSession<W, S> {
    world: W,
    world_width: f32,
    scene: S,
    player: LocalPlayer,
    remotes: RemotePlayerRegistry,
    projectiles: ProjectileSystem,
    lives: Lives,
    loadout: Loadout,
    local_id: Option<ConnectionId>,
    combat: CombatConfig,
    max_frame_delta: f32,
    reset_in: Option<f32>,
    outbox: Vec<ClientMessage>,
    events: Vec<ClientEvent>,
}

impl<W: BlockQuery, S: Scene> ClientSession<W, S> {
    /// Create a session for `world`, which must have been generated from
    /// `config.world`.
    pub fn new(config: &Config, world: W, scene: S) -> Self {
        Self {
            world,
            world_width: config.world.width as f32,
            scene,
            player: LocalPlayer::new(config.player.clone()),
            remotes: RemotePlayerRegistry::new(),
            projectiles: ProjectileSystem::new(&config.combat),
            lives: Lives::new(config.combat.starting_lives),
            loadout: Loadout::new(),
            local_id: None,
            combat: config.combat.clone(),
            max_frame_delta: config.player.max_frame_delta,
            reset_in: None,
            outbox: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Apply one message from the relay.
    pub fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Welcome(welcome) => {
                tracing::info!("Joined as {}", welcome.id);
                self.local_id = Some(welcome.id);
                self.remotes.remove(welcome.id, &mut self.scene);
            }
            ServerMessage::CurrentPlayers(players) => {
                for (id, state) in players {
                    if self.is_local(id) {
                        continue;
                    }
                    let transform = wire::state_transform(&state);
                    if !self.remotes.add(id, transform, &mut self.scene) {
                        self.remotes.update(id, transform, &mut self.scene);
                    }
                }
            }
            ServerMessage::NewPlayer(snapshot) => {
                if !self.is_local(snapshot.id) {
                    tracing::info!("Player {} joined", snapshot.id);
                    let transform = wire::snapshot_transform(&snapshot);
                    self.remotes.add(snapshot.id, transform, &mut self.scene);
                }
            }
            ServerMessage::PlayerMoved(snapshot) => {
                if !self.is_local(snapshot.id) {
                    let transform = wire::snapshot_transform(&snapshot);
                    self.remotes.update(snapshot.id, transform, &mut self.scene);
                }
            }
            ServerMessage::BulletFired(shot) => {
                self.projectiles
                    .on_remote_shoot(self.local_id, &shot, &mut self.scene);
            }
            ServerMessage::PlayerHit(hit) => {
                if self.is_local(hit.hit_player_id) {
                    self.on_local_hit(hit.shooter_id);
                }
            }
            ServerMessage::PlayerDisconnected(id) => {
                tracing::info!("Player {id} left");
                self.remotes.remove(id, &mut self.scene);
            }
        }
    }

    fn is_local(&self, id: ConnectionId) -> bool {
        self.local_id == Some(id)
    }

    fn on_local_hit(&mut self, shooter: ConnectionId) {
        match self.lives.apply_hit() {
            HitOutcome::Damaged { remaining } => {
                tracing::info!("Hit by {shooter}, {remaining} lives left");
                self.events.push(ClientEvent::Damaged {
                    shooter,
                    lives_left: remaining,
                });
            }
            HitOutcome::Eliminated => {
                tracing::info!("Eliminated by {shooter}");
                self.events.push(ClientEvent::Eliminated { shooter });
                self.reset_in = Some(self.combat.reset_delay_secs);
            }
            HitOutcome::Ignored => {}
        }
    }

    /// Run one frame.
    ///
    /// Order: weapon selection, controller step and movement report, firing,
    /// projectile update and hit reports, end-of-life countdown.
    pub fn tick(&mut self, dt: f32, input: &FrameInput) {
        let dt = dt.clamp(0.0, self.max_frame_delta);
        let accepting = input.accepting_input && !self.lives.is_eliminated();

        if accepting {
            if let Some(slot) = input.select_slot {
                self.loadout.select(slot);
            }
            if input.weapon_scroll != 0 {
                self.loadout.scroll(input.weapon_scroll);
            }
        }

        let controller_input = ControllerInput {
            intent: input.intent,
            look_delta: input.look_delta,
            accepting_input: accepting,
        };
        let moved = self
            .player
            .step(dt, &controller_input, &self.world, self.world_width);
        if let Some(transform) = moved
            && self.local_id.is_some()
        {
            self.outbox
                .push(ClientMessage::PlayerMovement(wire::movement_message(&transform)));
        }

        let gun_live = accepting && self.loadout.gun_active() && self.local_id.is_some();
        if input.fire
            && gun_live
            && let Some(id) = self.local_id
        {
            let shot = self
                .projectiles
                .fire(id, &self.player.view_ray(), &mut self.scene);
            self.outbox.push(ClientMessage::ShootBullet(shot));
            self.events.push(ClientEvent::Fired);
        }

        let avatars = self.avatar_centers();
        let hits = self
            .projectiles
            .update(dt, &self.world, &avatars, gun_live, &mut self.scene);
        for hit in hits {
            tracing::debug!("Judged hit on {} by {}", hit.hit_player_id, hit.shooter_id);
            self.outbox.push(ClientMessage::PlayerHit(hit));
        }

        if let Some(remaining) = self.reset_in.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.reset();
            }
        }
    }

    /// Hit-test targets: remote players in join order, then the local player.
    fn avatar_centers(&self) -> Vec<(ConnectionId, Vec3)> {
        let eye_offset = self.player.tuning().avatar_eye_offset;
        let mut avatars: Vec<_> = self
            .remotes
            .iter()
            .map(|(id, entry)| (id, avatar_center(&entry.transform, eye_offset)))
            .collect();
        if let Some(id) = self.local_id {
            avatars.push((id, self.player.avatar_center()));
        }
        avatars
    }

    /// Drop all session state and start over as a fresh, unconnected client.
    pub fn reset(&mut self) {
        tracing::info!("Session reset");
        self.remotes.clear(&mut self.scene);
        self.projectiles.clear(&mut self.scene);
        self.lives.reset();
        self.loadout.reset();
        self.player.respawn();
        self.local_id = None;
        self.reset_in = None;
        self.outbox.clear();
        self.events.push(ClientEvent::SessionReset);
    }

    /// Hand a finished avatar load to the registry.
    pub fn complete_avatar_load(
        &mut self,
        id: ConnectionId,
        result: Result<ProxyHandle, AvatarLoadError>,
    ) -> bool {
        self.remotes.complete_avatar_load(id, result, &mut self.scene)
    }

    /// Messages queued for the relay since the last call.
    pub fn drain_outgoing(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// UI/audio events since the last call.
    pub fn drain_events(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn local_id(&self) -> Option<ConnectionId> {
        self.local_id
    }

    pub fn lives(&self) -> &Lives {
        &self.lives
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    pub fn player(&self) -> &LocalPlayer {
        &self.player
    }

    pub fn remotes(&self) -> &RemotePlayerRegistry {
        &self.remotes
    }

    pub fn projectiles(&self) -> &ProjectileSystem {
        &self.projectiles
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Seconds until the pending reset, if eliminated.
    pub fn reset_pending(&self) -> Option<f32> {
        self.reset_in
    }
}
