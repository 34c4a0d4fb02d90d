//! First-person local player controller.
//!
//! Integrates movement intent and gravity into velocity, moves the eye
//! position, pushes the player box out of solid voxels, and clamps to the
//! world's horizontal extent. The controller owns the only copy of the local
//! player's state; network messages never write to it.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use voxfire_config::PlayerConfig;
use voxfire_voxel::BlockQuery;

use crate::aabb::Aabb;
use crate::transform::{Transform, wrap_angle};
use crate::voxel_collision::resolve_against_world;

/// Margin kept between the player and each horizontal world edge.
const WORLD_EDGE_MARGIN: f32 = 0.5;

/// Pitch stays just short of straight up/down.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Movement keys held this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementIntent {
    /// Move toward the facing direction.
    pub forward: bool,
    /// Move away from the facing direction.
    pub backward: bool,
    /// Strafe left.
    pub left: bool,
    /// Strafe right.
    pub right: bool,
    /// Jump if standing on something.
    pub jump: bool,
}

impl MovementIntent {
    /// Planar intent in view space: `x` is rightward, `y` is forward.
    /// Normalized, or zero when no (or only cancelling) keys are held.
    pub fn planar(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.forward {
            v.y += 1.0;
        }
        if self.backward {
            v.y -= 1.0;
        }
        if self.left {
            v.x -= 1.0;
        }
        if self.right {
            v.x += 1.0;
        }
        v.normalize_or_zero()
    }
}

/// Everything the controller reads from the input layer for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControllerInput {
    /// Movement keys.
    pub intent: MovementIntent,
    /// Accumulated pointer motion since the last frame.
    pub look_delta: Vec2,
    /// `false` while first-person lock is disengaged (menus, orbit view).
    pub accepting_input: bool,
}

/// Ray from the eye through the screen center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewRay {
    /// Eye position.
    pub origin: Vec3,
    /// Unit view direction.
    pub direction: Vec3,
}

/// Local player state: pose, camera pitch, velocity and ground contact.
#[derive(Clone, Debug)]
pub struct LocalPlayer {
    /// Synchronized pose (eye position + yaw).
    pub transform: Transform,
    /// Camera pitch in radians. Never sent to peers.
    pub pitch: f32,
    /// Current velocity in blocks per second.
    pub velocity: Vec3,
    /// Set only by an upward collision push during the latest step.
    pub grounded: bool,
    tuning: PlayerConfig,
}

impl LocalPlayer {
    /// Creates a player at the configured spawn position.
    pub fn new(tuning: PlayerConfig) -> Self {
        Self {
            transform: Transform::new(Vec3::from_array(tuning.spawn_position), 0.0),
            pitch: 0.0,
            velocity: Vec3::ZERO,
            grounded: false,
            tuning,
        }
    }

    /// Movement tuning in use.
    pub fn tuning(&self) -> &PlayerConfig {
        &self.tuning
    }

    /// Puts the player back at spawn with no velocity.
    pub fn respawn(&mut self) {
        *self = Self::new(self.tuning.clone());
    }

    /// Player box for the current position.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_eye(
            self.transform.position,
            self.tuning.half_width,
            self.tuning.height,
        )
    }

    /// Center of the avatar used by projectile hit tests.
    pub fn avatar_center(&self) -> Vec3 {
        avatar_center(&self.transform, self.tuning.avatar_eye_offset)
    }

    /// Applies pointer motion. Moving right decreases yaw; moving down
    /// lowers pitch.
    pub fn apply_look(&mut self, delta: Vec2) {
        let sensitivity = self.tuning.mouse_sensitivity;
        self.transform.yaw = wrap_angle(self.transform.yaw - delta.x * sensitivity);
        self.pitch = (self.pitch - delta.y * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Ray from the eye along the current yaw and pitch.
    pub fn view_ray(&self) -> ViewRay {
        let (sin_yaw, cos_yaw) = self.transform.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        ViewRay {
            origin: self.transform.position,
            direction: Vec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch),
        }
    }

    /// Advances the player by `dt` seconds.
    ///
    /// Returns the transform to broadcast when input is being accepted. When
    /// it is not, intent and look are ignored but gravity and collision still
    /// run, and nothing is returned.
    pub fn step<W: BlockQuery + ?Sized>(
        &mut self,
        dt: f32,
        input: &ControllerInput,
        world: &W,
        world_width: f32,
    ) -> Option<Transform> {
        let intent = if input.accepting_input {
            self.apply_look(input.look_delta);
            input.intent
        } else {
            MovementIntent::default()
        };

        let planar = intent.planar();
        let direction = self.transform.right() * planar.x + self.transform.forward() * planar.y;
        self.velocity.x = direction.x * self.tuning.speed;
        self.velocity.z = direction.z * self.tuning.speed;

        self.velocity.y -= self.tuning.gravity * dt;
        if intent.jump && self.grounded {
            self.velocity.y = self.tuning.jump_speed;
            self.grounded = false;
        }

        let position = &mut self.transform.position;
        position.x += self.velocity.x * dt;
        position.z += self.velocity.z * dt;
        position.y += self.velocity.y * dt;

        self.resolve_collisions(world);

        self.transform.position = clamp_to_world(self.transform.position, world_width);

        input.accepting_input.then_some(self.transform)
    }

    fn resolve_collisions<W: BlockQuery + ?Sized>(&mut self, world: &W) {
        let before = self.aabb();
        let resolution = resolve_against_world(&before, world);

        self.grounded = false;
        for hit in &resolution.hits {
            self.velocity[hit.axis.index()] = 0.0;
            if hit.is_upward() {
                self.grounded = true;
            }
        }
        self.transform.position += resolution.offset_from(&before);
    }
}

/// Avatar center for a pose: the eye position lowered by `eye_offset`.
pub fn avatar_center(transform: &Transform, eye_offset: f32) -> Vec3 {
    transform.position - Vec3::new(0.0, eye_offset, 0.0)
}

/// Clamps X and Z into `[0.5, world_width - 0.5]`. Y is left alone.
pub fn clamp_to_world(position: Vec3, world_width: f32) -> Vec3 {
    let max = (world_width - WORLD_EDGE_MARGIN).max(WORLD_EDGE_MARGIN);
    Vec3::new(
        position.x.clamp(WORLD_EDGE_MARGIN, max),
        position.y,
        position.z.clamp(WORLD_EDGE_MARGIN, max),
    )
}
