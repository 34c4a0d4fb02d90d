//! Position + yaw, the part of a player's pose that crosses the network.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// A player's synchronized pose. Pitch is camera-only and never part of it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    /// Eye position in world space.
    pub position: Vec3,
    /// Heading in radians, wrapped into `(-π, π]`. Zero faces −Z.
    pub yaw: f32,
}

impl Transform {
    /// Creates a transform, wrapping `yaw` into range.
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            yaw: wrap_angle(yaw),
        }
    }

    /// Horizontal unit vector the transform faces.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Horizontal unit vector to the right of [`forward`](Self::forward).
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }
}

/// Wraps an angle into `(-π, π]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}
