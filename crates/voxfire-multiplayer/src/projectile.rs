//! Bullets in flight and client-side hit judging.
//!
//! Projectiles fired here and projectiles announced by the relay live in two
//! separate lists. Every client advances both lists itself and judges hits
//! against the avatars it knows about; the relay never simulates.

use glam::Vec3;
use voxfire_config::CombatConfig;
use voxfire_net::{BulletShot, ConnectionId, PlayerHit};
use voxfire_physics::ViewRay;
use voxfire_voxel::{BlockQuery, VoxelCoord};

use crate::scene::{ProxyHandle, Scene};
use crate::wire;

/// Where a projectile was spawned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileOrigin {
    /// Fired by this client.
    Local,
    /// Announced by the relay on behalf of a peer.
    Remote,
}

/// A single bullet and its visual.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    /// World-space position after the latest advance.
    pub position: Vec3,
    /// Units per second along the firing direction.
    pub velocity: Vec3,
    /// Connection that fired the shot; never hit by it.
    pub shooter: ConnectionId,
    /// Which list the projectile lives in.
    pub origin: ProjectileOrigin,
    proxy: ProxyHandle,
}

/// Why a projectile left the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Retire {
    OutOfRange,
    Block,
    Hit(ConnectionId),
}

/// Both projectile lists plus the ballistics tuning.
#[derive(Debug)]
pub struct ProjectileSystem {
    local: Vec<Projectile>,
    remote: Vec<Projectile>,
    bullet_speed: f32,
    max_range: f32,
    hit_radius: f32,
}

impl ProjectileSystem {
    pub fn new(combat: &CombatConfig) -> Self {
        Self {
            local: Vec::new(),
            remote: Vec::new(),
            bullet_speed: combat.bullet_speed,
            max_range: combat.max_range,
            hit_radius: combat.hit_radius,
        }
    }

    /// Spawn a local projectile along `ray` and return the `shootBullet`
    /// payload announcing it. Callers decide whether firing is allowed.
    pub fn fire<S: Scene + ?Sized>(
        &mut self,
        shooter: ConnectionId,
        ray: &ViewRay,
        scene: &mut S,
    ) -> BulletShot {
        self.spawn(shooter, ray, ProjectileOrigin::Local, scene);
        wire::shot_message(shooter, ray)
    }

    /// Spawn a projectile for a shot relayed from a peer.
    ///
    /// Echoes of our own shots and shots with a degenerate direction are
    /// dropped. Returns whether a projectile was spawned.
    pub fn on_remote_shoot<S: Scene + ?Sized>(
        &mut self,
        local_id: Option<ConnectionId>,
        shot: &BulletShot,
        scene: &mut S,
    ) -> bool {
        if Some(shot.id) == local_id {
            return false;
        }
        let Some(ray) = wire::shot_ray(shot) else {
            tracing::warn!("Dropping malformed shot from {}", shot.id);
            return false;
        };
        self.spawn(shot.id, &ray, ProjectileOrigin::Remote, scene);
        true
    }

    fn spawn<S: Scene + ?Sized>(
        &mut self,
        shooter: ConnectionId,
        ray: &ViewRay,
        origin: ProjectileOrigin,
        scene: &mut S,
    ) {
        let projectile = Projectile {
            position: ray.origin,
            velocity: ray.direction * self.bullet_speed,
            shooter,
            origin,
            proxy: scene.spawn_projectile(ray.origin),
        };
        match origin {
            ProjectileOrigin::Local => self.local.push(projectile),
            ProjectileOrigin::Remote => self.remote.push(projectile),
        }
    }

    /// Advance projectiles by `dt` and judge collisions.
    ///
    /// `avatars` lists every known player as `(id, center)`, in the order
    /// hits are tested. The remote list always advances; the local list only
    /// when `advance_local` is set. Returns one report per player hit, oldest
    /// projectile first, local list before remote.
    pub fn update<W, S>(
        &mut self,
        dt: f32,
        world: &W,
        avatars: &[(ConnectionId, Vec3)],
        advance_local: bool,
        scene: &mut S,
    ) -> Vec<PlayerHit>
    where
        W: BlockQuery + ?Sized,
        S: Scene + ?Sized,
    {
        let mut hits = Vec::new();
        if advance_local {
            self.advance(ProjectileOrigin::Local, dt, world, avatars, scene, &mut hits);
        }
        self.advance(ProjectileOrigin::Remote, dt, world, avatars, scene, &mut hits);
        hits
    }

    fn advance<W, S>(
        &mut self,
        which: ProjectileOrigin,
        dt: f32,
        world: &W,
        avatars: &[(ConnectionId, Vec3)],
        scene: &mut S,
        hits: &mut Vec<PlayerHit>,
    ) where
        W: BlockQuery + ?Sized,
        S: Scene + ?Sized,
    {
        let (max_range, hit_radius) = (self.max_range, self.hit_radius);
        let list = match which {
            ProjectileOrigin::Local => &mut self.local,
            ProjectileOrigin::Remote => &mut self.remote,
        };

        list.retain_mut(|p| {
            p.position += p.velocity * dt;

            let retire = if p.position.length() > max_range {
                Some(Retire::OutOfRange)
            } else if world.is_solid(VoxelCoord::from_world(p.position)) {
                Some(Retire::Block)
            } else {
                avatars
                    .iter()
                    .find(|(id, center)| {
                        *id != p.shooter && p.position.distance(*center) < hit_radius
                    })
                    .map(|(id, _)| Retire::Hit(*id))
            };

            match retire {
                None => {
                    scene.set_proxy_position(p.proxy, p.position);
                    true
                }
                Some(reason) => {
                    tracing::trace!("Projectile from {} retired: {reason:?}", p.shooter);
                    if let Retire::Hit(victim) = reason {
                        hits.push(PlayerHit {
                            hit_player_id: victim,
                            shooter_id: p.shooter,
                        });
                    }
                    scene.despawn(p.proxy);
                    false
                }
            }
        });
    }

    /// Retire everything, freeing each visual.
    pub fn clear<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        for p in self.local.drain(..).chain(self.remote.drain(..)) {
            scene.despawn(p.proxy);
        }
    }

    pub fn local(&self) -> &[Projectile] {
        &self.local
    }

    pub fn remote(&self) -> &[Projectile] {
        &self.remote
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.remote.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::HeadlessScene;
    use voxfire_net::WireVec3;
    use voxfire_voxel::{BlockId, VoxelWorld, WorldSize};

    const DT: f32 = 1.0 / 60.0;

    fn system() -> ProjectileSystem {
        ProjectileSystem::new(&CombatConfig::default())
    }

    fn open_world() -> VoxelWorld {
        VoxelWorld::new(WorldSize {
            width: 32,
            height: 16,
        })
    }

    fn ray(origin: Vec3, direction: Vec3) -> ViewRay {
        ViewRay { origin, direction }
    }

    #[test]
    fn test_fire_spawns_local_and_builds_message() {
        let mut scene = HeadlessScene::new();
        let mut projectiles = system();
        let shot = projectiles.fire(
            ConnectionId(1),
            &ray(Vec3::new(5.0, 5.0, 5.0), Vec3::NEG_Z),
            &mut scene,
        );

        assert_eq!(shot.id, ConnectionId(1));
        assert_eq!(shot.direction, WireVec3::new(0.0, 0.0, -1.0));
        assert_eq!(projectiles.local().len(), 1);
        assert_eq!(projectiles.local()[0].velocity, Vec3::new(0.0, 0.0, -60.0));
        assert_eq!(scene.live_count(), 1);
    }

    #[test]
    fn test_own_echo_ignored() {
        let mut scene = HeadlessScene::new();
        let mut projectiles = system();
        let shot = BulletShot {
            id: ConnectionId(1),
            origin: WireVec3::default(),
            direction: WireVec3::new(1.0, 0.0, 0.0),
        };

        assert!(!projectiles.on_remote_shoot(Some(ConnectionId(1)), &shot, &mut scene));
        assert!(projectiles.on_remote_shoot(Some(ConnectionId(2)), &shot, &mut scene));
        assert_eq!(projectiles.remote().len(), 1);
        assert_eq!(projectiles.remote()[0].origin, ProjectileOrigin::Remote);
    }

    #[test]
    fn test_out_of_range_retired_exactly_once() {
        let mut scene = HeadlessScene::new();
        let mut projectiles = system();
        projectiles.fire(
            ConnectionId(1),
            &ray(Vec3::new(0.0, 99.5, 0.0), Vec3::Y),
            &mut scene,
        );

        let world = open_world();
        for _ in 0..10 {
            projectiles.update(DT, &world, &[], true, &mut scene);
        }
        assert!(projectiles.is_empty());
        assert_eq!(scene.despawn_count(), 1);
        assert_eq!(scene.live_count(), 0);
    }

    #[test]
    fn test_block_stops_projectile() {
        let mut scene = HeadlessScene::new();
        let mut projectiles = system();
        let mut world = open_world();
        world.set_block_id(VoxelCoord::new(5, 5, 3), BlockId::GRASS);

        projectiles.fire(
            ConnectionId(1),
            &ray(Vec3::new(5.5, 5.5, 5.5), Vec3::NEG_Z),
            &mut scene,
        );
        let victim = [(ConnectionId(2), Vec3::new(5.5, 5.5, 1.5))];
        let mut hits = Vec::new();
        for _ in 0..10 {
            hits.extend(projectiles.update(DT, &world, &victim, true, &mut scene));
        }
        assert!(hits.is_empty(), "block should shield the player behind it");
        assert!(projectiles.is_empty());
    }

    #[test]
    fn test_hit_reports_victim_and_shooter() {
        let mut scene = HeadlessScene::new();
        let mut projectiles = system();
        let world = open_world();
        projectiles.fire(
            ConnectionId(1),
            &ray(Vec3::new(5.5, 5.5, 10.0), Vec3::NEG_Z),
            &mut scene,
        );
        let avatars = [(ConnectionId(2), Vec3::new(5.5, 5.5, 6.0))];

        let mut hits = Vec::new();
        for _ in 0..10 {
            hits.extend(projectiles.update(DT, &world, &avatars, true, &mut scene));
        }
        assert_eq!(
            hits,
            vec![PlayerHit {
                hit_player_id: ConnectionId(2),
                shooter_id: ConnectionId(1),
            }]
        );
        assert!(projectiles.is_empty());
    }

    #[test]
    fn test_never_hits_own_shooter() {
        let mut scene = HeadlessScene::new();
        let mut projectiles = system();
        let world = open_world();
        let origin = Vec3::new(5.5, 5.5, 5.5);
        projectiles.fire(ConnectionId(1), &ray(origin, Vec3::X), &mut scene);

        let avatars = [(ConnectionId(1), origin)];
        let hits = projectiles.update(DT, &world, &avatars, true, &mut scene);
        assert!(hits.is_empty());
        assert_eq!(projectiles.local().len(), 1);
    }

    #[test]
    fn test_first_avatar_in_list_wins() {
        let mut scene = HeadlessScene::new();
        let mut projectiles = system();
        let world = open_world();
        projectiles.fire(
            ConnectionId(1),
            &ray(Vec3::new(5.5, 5.5, 5.5), Vec3::X),
            &mut scene,
        );
        let at = Vec3::new(6.5, 5.5, 5.5);
        let avatars = [(ConnectionId(3), at), (ConnectionId(2), at)];

        let hits = projectiles.update(DT, &world, &avatars, true, &mut scene);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].hit_player_id, ConnectionId(3));
    }

    #[test]
    fn test_local_list_frozen_when_not_advancing() {
        let mut scene = HeadlessScene::new();
        let mut projectiles = system();
        let world = open_world();
        let origin = Vec3::new(5.5, 5.5, 5.5);
        projectiles.fire(ConnectionId(1), &ray(origin, Vec3::X), &mut scene);
        let remote = BulletShot {
            id: ConnectionId(2),
            origin: origin.into(),
            direction: WireVec3::new(0.0, 0.0, 1.0),
        };
        projectiles.on_remote_shoot(Some(ConnectionId(1)), &remote, &mut scene);

        projectiles.update(DT, &world, &[], false, &mut scene);
        assert_eq!(projectiles.local()[0].position, origin);
        assert!(projectiles.remote()[0].position.z > origin.z);
    }

    #[test]
    fn test_clear_frees_every_visual() {
        let mut scene = HeadlessScene::new();
        let mut projectiles = system();
        projectiles.fire(ConnectionId(1), &ray(Vec3::ONE, Vec3::X), &mut scene);
        projectiles.fire(ConnectionId(1), &ray(Vec3::ONE, Vec3::Y), &mut scene);

        projectiles.clear(&mut scene);
        assert!(projectiles.is_empty());
        assert_eq!(scene.live_count(), 0);
    }
}
