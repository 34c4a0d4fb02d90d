//! Conversions between simulation poses and relay payloads.

use glam::Vec3;
use voxfire_net::{
    BulletShot, ConnectionId, PlayerMovement, PlayerSnapshot, PlayerState, Rotation,
};
use voxfire_physics::{Transform, ViewRay};

/// Pose carried by a `newPlayer` / `playerMoved` snapshot.
pub fn snapshot_transform(snapshot: &PlayerSnapshot) -> Transform {
    Transform::new(snapshot.position.into(), snapshot.rotation.y)
}

/// Pose held in a `currentPlayers` record.
pub fn state_transform(state: &PlayerState) -> Transform {
    Transform::new(state.position.into(), state.rotation.y)
}

/// `playerMovement` payload for a local pose.
pub fn movement_message(transform: &Transform) -> PlayerMovement {
    PlayerMovement {
        position: transform.position.into(),
        rotation: Rotation {
            y: transform.yaw,
        },
    }
}

/// `shootBullet` payload for a ray fired by `shooter`.
pub fn shot_message(shooter: ConnectionId, ray: &ViewRay) -> BulletShot {
    BulletShot {
        id: shooter,
        origin: ray.origin.into(),
        direction: ray.direction.into(),
    }
}

/// Ray described by a relayed shot, or `None` for a zero or non-finite
/// direction.
pub fn shot_ray(shot: &BulletShot) -> Option<ViewRay> {
    let origin = Vec3::from(shot.origin);
    let direction = Vec3::from(shot.direction).try_normalize()?;
    origin.is_finite().then_some(ViewRay { origin, direction })
}
