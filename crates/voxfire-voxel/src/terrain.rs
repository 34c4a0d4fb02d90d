//! Seeded heightmap terrain.
//!
//! Each column is filled from the bottom up to a height sampled from 2D
//! simplex noise. The same seed yields the same world on every client.

use noise::{NoiseFn, Simplex};
use voxfire_config::WorldConfig;

use crate::block::BlockId;
use crate::coords::VoxelCoord;
use crate::world::VoxelWorld;

/// Parameters for [`generate_terrain`].
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainParams {
    /// Noise seed.
    pub seed: u32,
    /// Horizontal scale divisor applied to cell coordinates before sampling.
    pub scale: f64,
    /// Noise amplitude as a fraction of world height.
    pub magnitude: f64,
    /// Base height as a fraction of world height.
    pub offset: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self::from(&WorldConfig::default())
    }
}

impl From<&WorldConfig> for TerrainParams {
    fn from(config: &WorldConfig) -> Self {
        Self {
            seed: config.seed,
            scale: config.terrain_scale,
            magnitude: config.terrain_magnitude,
            offset: config.terrain_offset,
        }
    }
}

/// Column height in blocks, clamped to `[1, world_height - 1]`.
pub fn column_height(
    noise: &Simplex,
    params: &TerrainParams,
    x: u32,
    z: u32,
    world_height: u32,
) -> u32 {
    let value = noise.get([x as f64 / params.scale, z as f64 / params.scale]);
    let scaled = params.offset + params.magnitude * value;
    let height = (world_height as f64 * scaled).floor() as i64;
    height.clamp(1, world_height.saturating_sub(1).max(1) as i64) as u32
}

/// Fills `world` with grass columns. Existing blocks above each column are
/// left untouched.
pub fn generate_terrain(world: &mut VoxelWorld, params: &TerrainParams) {
    let size = world.size();
    let noise = Simplex::new(params.seed);

    for x in 0..size.width {
        for z in 0..size.width {
            let height = column_height(&noise, params, x, z, size.height);
            for y in 0..height {
                let coord = VoxelCoord::new(x as i32, y as i32, z as i32);
                world.set_block_id(coord, BlockId::GRASS);
            }
        }
    }

    tracing::debug!(
        "Generated {}x{}x{} terrain (seed {}), {} solid blocks",
        size.width,
        size.height,
        size.width,
        params.seed,
        world.solid_count()
    );
}
