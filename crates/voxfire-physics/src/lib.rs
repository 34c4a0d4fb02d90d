//! Player physics: axis-aligned boxes, minimum-penetration voxel collision,
//! and the first-person local player controller.
//!
//! There is no rigid-body engine here. The controller integrates velocity
//! directly and pushes its box out of solid cells one axis at a time.

pub mod aabb;
pub mod player_controller;
pub mod transform;
pub mod voxel_collision;

#[cfg(test)]
mod player_controller_tests;

pub use aabb::Aabb;
pub use player_controller::{
    ControllerInput, LocalPlayer, MovementIntent, ViewRay, avatar_center, clamp_to_world,
};
pub use transform::{Transform, wrap_angle};
pub use voxel_collision::{
    Axis, AxisHit, PushDirection, Resolution, resolve_against_world, resolve_block,
};
