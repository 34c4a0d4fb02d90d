//! Unit tests for the local player controller.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use voxfire_config::PlayerConfig;
use voxfire_voxel::{BlockId, VoxelCoord, VoxelWorld, WorldSize};

use crate::player_controller::{ControllerInput, LocalPlayer, MovementIntent, clamp_to_world};

const DT: f32 = 1.0 / 60.0;

fn empty_world(width: u32) -> VoxelWorld {
    VoxelWorld::new(WorldSize { width, height: 16 })
}

/// 10×10 world with a solid floor layer at y = 0 (top face at y = 1).
fn floor_world() -> VoxelWorld {
    let mut world = empty_world(10);
    for x in 0..10 {
        for z in 0..10 {
            world.set_block_id(VoxelCoord::new(x, 0, z), BlockId::GRASS);
        }
    }
    world
}

fn player_at(eye: Vec3) -> LocalPlayer {
    LocalPlayer::new(PlayerConfig {
        spawn_position: eye.to_array(),
        ..Default::default()
    })
}

fn input(intent: MovementIntent) -> ControllerInput {
    ControllerInput {
        intent,
        look_delta: Vec2::ZERO,
        accepting_input: true,
    }
}

fn idle() -> ControllerInput {
    input(MovementIntent::default())
}

fn settle(player: &mut LocalPlayer, world: &VoxelWorld, frames: usize) {
    for _ in 0..frames {
        player.step(DT, &idle(), world, world.width());
    }
}

#[test]
fn test_free_fall_accumulates_gravity() {
    let world = empty_world(10);
    let mut player = player_at(Vec3::new(5.0, 10.0, 5.0));

    player.step(DT, &idle(), &world, world.width());
    assert!((player.velocity.y + 40.0 * DT).abs() < 1e-5);
    assert!(player.transform.position.y < 10.0);
    assert!(!player.grounded);

    player.step(DT, &idle(), &world, world.width());
    assert!((player.velocity.y + 80.0 * DT).abs() < 1e-4);
}

#[test]
fn test_lands_on_floor_and_becomes_grounded() {
    let world = floor_world();
    let mut player = player_at(Vec3::new(5.0, 3.0, 5.0));

    settle(&mut player, &world, 60);

    assert!(player.grounded);
    assert_eq!(player.velocity.y, 0.0);
    let feet = player.aabb().min.y;
    assert!((feet - 1.0).abs() < 1e-3, "feet at {feet}");
}

#[test]
fn test_jump_requires_ground() {
    let world = empty_world(10);
    let mut player = player_at(Vec3::new(5.0, 10.0, 5.0));
    let jump = input(MovementIntent {
        jump: true,
        ..Default::default()
    });

    player.step(DT, &jump, &world, world.width());
    assert!(player.velocity.y < 0.0, "mid-air jump must be a no-op");
}

#[test]
fn test_jump_from_ground_is_edge_triggered() {
    let world = floor_world();
    let mut player = player_at(Vec3::new(5.0, 2.9, 5.0));
    settle(&mut player, &world, 30);
    assert!(player.grounded);

    let jump = input(MovementIntent {
        jump: true,
        ..Default::default()
    });
    player.step(DT, &jump, &world, world.width());
    assert_eq!(player.velocity.y, 12.0);
    assert!(!player.grounded, "jumping consumes the grounded flag");

    // Holding jump in the air does not re-apply jump speed.
    player.step(DT, &jump, &world, world.width());
    assert!(player.velocity.y < 12.0);
}

#[test]
fn test_grounded_only_from_upward_push() {
    // A single block beside the player, no floor.
    let mut world = empty_world(10);
    world.set_block_id(VoxelCoord::new(6, 5, 5), BlockId::GRASS);
    let mut player = player_at(Vec3::new(5.6, 6.8, 5.5));
    let right = input(MovementIntent {
        right: true,
        ..Default::default()
    });

    player.step(DT, &right, &world, world.width());
    assert!(!player.grounded, "side contact must not ground the player");
    assert!(player.aabb().max.x <= 6.0 + 1e-4);
}

#[test]
fn test_wall_blocks_horizontal_motion() {
    let mut world = floor_world();
    for y in 1..4 {
        for z in 0..10 {
            world.set_block_id(VoxelCoord::new(7, y, z), BlockId::DIRT);
        }
    }
    let mut player = player_at(Vec3::new(5.5, 2.8, 4.5));
    settle(&mut player, &world, 10);

    let right = input(MovementIntent {
        right: true,
        ..Default::default()
    });
    for _ in 0..60 {
        player.step(DT, &right, &world, world.width());
    }

    assert!(player.transform.position.x <= 6.75 + 1e-3);
    assert!(player.grounded);
    assert!(player.aabb().max.x <= 7.0 + 1e-3);
}

#[test]
fn test_forward_at_zero_yaw_moves_negative_z() {
    let world = empty_world(20);
    let mut player = player_at(Vec3::new(10.0, 10.0, 10.0));
    let forward = input(MovementIntent {
        forward: true,
        ..Default::default()
    });

    player.step(DT, &forward, &world, world.width());
    assert!(player.transform.position.z < 10.0);
    assert!((player.transform.position.x - 10.0).abs() < 1e-5);
    assert!((player.velocity.z + 10.0).abs() < 1e-4);
}

#[test]
fn test_diagonal_intent_is_normalized() {
    let world = empty_world(20);
    let mut player = player_at(Vec3::new(10.0, 10.0, 10.0));
    let diagonal = input(MovementIntent {
        forward: true,
        right: true,
        ..Default::default()
    });

    player.step(DT, &diagonal, &world, world.width());
    let horizontal = Vec2::new(player.velocity.x, player.velocity.z);
    assert!((horizontal.length() - 10.0).abs() < 1e-3);
}

#[test]
fn test_opposing_keys_cancel() {
    let intent = MovementIntent {
        forward: true,
        backward: true,
        ..Default::default()
    };
    assert_eq!(intent.planar(), Vec2::ZERO);
}

#[test]
fn test_horizontal_clamp_to_world_width() {
    let clamped = clamp_to_world(Vec3::new(9.8, 3.0, -2.0), 10.0);
    assert!(clamped.x <= 9.5);
    assert_eq!(clamped.z, 0.5);
    assert_eq!(clamped.y, 3.0, "vertical position is not clamped");

    let world = empty_world(10);
    let mut player = player_at(Vec3::new(9.8, 40.0, 5.0));
    player.step(DT, &idle(), &world, world.width());
    assert!(player.transform.position.x <= 9.5);
}

#[test]
fn test_disabled_input_ignores_intent_and_emits_nothing() {
    let world = floor_world();
    let mut player = player_at(Vec3::new(5.0, 2.8, 5.0));
    let disabled = ControllerInput {
        intent: MovementIntent {
            forward: true,
            jump: true,
            ..Default::default()
        },
        look_delta: Vec2::new(500.0, 0.0),
        accepting_input: false,
    };

    let sent = player.step(DT, &disabled, &world, world.width());
    assert!(sent.is_none());
    assert_eq!(player.transform.yaw, 0.0);
    assert!((player.transform.position.z - 5.0).abs() < 1e-5);
}

#[test]
fn test_enabled_input_emits_every_frame() {
    let world = floor_world();
    let mut player = player_at(Vec3::new(5.0, 2.8, 5.0));
    for _ in 0..3 {
        let sent = player.step(DT, &idle(), &world, world.width());
        assert_eq!(sent, Some(player.transform));
    }
}

#[test]
fn test_look_right_decreases_yaw_and_wraps() {
    let mut player = player_at(Vec3::new(5.0, 5.0, 5.0));
    player.apply_look(Vec2::new(100.0, 0.0));
    assert!(player.transform.yaw < 0.0);

    player.apply_look(Vec2::new(10_000.0, 0.0));
    assert!(player.transform.yaw > -PI && player.transform.yaw <= PI);
}

#[test]
fn test_pitch_is_clamped() {
    let mut player = player_at(Vec3::new(5.0, 5.0, 5.0));
    player.apply_look(Vec2::new(0.0, -100_000.0));
    assert!(player.pitch < PI / 2.0);
    assert!(player.view_ray().direction.y > 0.99);
}

#[test]
fn test_view_ray_follows_yaw() {
    let mut player = player_at(Vec3::new(5.0, 5.0, 5.0));
    let ray = player.view_ray();
    assert_eq!(ray.origin, Vec3::new(5.0, 5.0, 5.0));
    assert!((ray.direction - Vec3::NEG_Z).length() < 1e-5);

    player.transform.yaw = -PI / 2.0;
    assert!((player.view_ray().direction - Vec3::X).length() < 1e-5);
}

#[test]
fn test_respawn_resets_state() {
    let mut player = player_at(Vec3::new(5.0, 5.0, 5.0));
    player.velocity = Vec3::new(1.0, 2.0, 3.0);
    player.transform.position = Vec3::ZERO;
    player.grounded = true;

    player.respawn();
    assert_eq!(player.transform.position, Vec3::new(5.0, 5.0, 5.0));
    assert_eq!(player.velocity, Vec3::ZERO);
    assert!(!player.grounded);
}
