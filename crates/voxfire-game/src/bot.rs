//! Scripted input for the headless client: walk forward, turn now and then,
//! hop occasionally, and fire on a fixed cadence.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use voxfire_multiplayer::FrameInput;
use voxfire_physics::MovementIntent;

/// Pointer units per second at the fastest turn.
const MAX_TURN_RATE: f32 = 400.0;
const JUMP_CHANCE: f64 = 0.01;

pub struct Bot {
    rng: StdRng,
    turn_rate: f32,
    turn_left: f32,
    fire_interval: f32,
    fire_in: f32,
}

impl Bot {
    pub fn new(seed: u64, fire_interval: f32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            turn_rate: 0.0,
            turn_left: 0.0,
            fire_interval,
            fire_in: fire_interval,
        }
    }

    /// Input for the next frame.
    pub fn next_input(&mut self, dt: f32) -> FrameInput {
        self.turn_left -= dt;
        if self.turn_left <= 0.0 {
            self.turn_rate = self.rng.random_range(-MAX_TURN_RATE..=MAX_TURN_RATE);
            self.turn_left = self.rng.random_range(0.5..2.0);
        }

        self.fire_in -= dt;
        let fire = self.fire_in <= 0.0;
        if fire {
            self.fire_in += self.fire_interval;
        }

        FrameInput {
            intent: MovementIntent {
                forward: true,
                jump: self.rng.random_bool(JUMP_CHANCE),
                ..Default::default()
            },
            look_delta: Vec2::new(self.turn_rate * dt, 0.0),
            accepting_input: true,
            fire,
            select_slot: None,
            weapon_scroll: 0,
        }
    }
}
