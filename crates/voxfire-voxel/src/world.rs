//! Dense block grid for the playable world.

use voxfire_config::WorldConfig;

use crate::block::{Block, BlockId};
use crate::coords::VoxelCoord;
use crate::query::BlockQuery;
use crate::terrain::{TerrainParams, generate_terrain};

/// World extent in blocks. X and Z share `width`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldSize {
    /// Extent along X and Z.
    pub width: u32,
    /// Extent along Y.
    pub height: u32,
}

/// A `width × height × width` grid of blocks, initially empty.
#[derive(Clone, Debug)]
pub struct VoxelWorld {
    size: WorldSize,
    data: Vec<Block>,
}

impl VoxelWorld {
    /// Creates an empty world of the given size.
    pub fn new(size: WorldSize) -> Self {
        let volume = size.width as usize * size.height as usize * size.width as usize;
        Self {
            size,
            data: vec![Block::EMPTY; volume],
        }
    }

    /// Creates a world from config and fills it with seeded terrain.
    pub fn generate(config: &WorldConfig) -> Self {
        let mut world = Self::new(WorldSize {
            width: config.width,
            height: config.height,
        });
        generate_terrain(&mut world, &TerrainParams::from(config));
        world
    }

    /// World extent.
    pub fn size(&self) -> WorldSize {
        self.size
    }

    /// Horizontal extent as a float, used for position clamping.
    pub fn width(&self) -> f32 {
        self.size.width as f32
    }

    /// Returns `true` if the cell lies inside the grid.
    pub fn in_bounds(&self, coord: VoxelCoord) -> bool {
        coord.x >= 0
            && (coord.x as u32) < self.size.width
            && coord.y >= 0
            && (coord.y as u32) < self.size.height
            && coord.z >= 0
            && (coord.z as u32) < self.size.width
    }

    fn index(&self, coord: VoxelCoord) -> Option<usize> {
        if !self.in_bounds(coord) {
            return None;
        }
        let width = self.size.width as usize;
        let height = self.size.height as usize;
        Some((coord.x as usize * height + coord.y as usize) * width + coord.z as usize)
    }

    /// Sets the block type at a cell. Out-of-bounds writes are ignored.
    pub fn set_block_id(&mut self, coord: VoxelCoord, id: BlockId) {
        if let Some(i) = self.index(coord) {
            self.data[i].id = id;
        }
    }

    /// Sets the render instance slot at a cell. Out-of-bounds writes are ignored.
    pub fn set_block_instance_id(&mut self, coord: VoxelCoord, instance_id: Option<u32>) {
        if let Some(i) = self.index(coord) {
            self.data[i].instance_id = instance_id;
        }
    }

    /// Numbers every non-empty block in x, y, z order and clears the slot of
    /// empty ones. Returns the number of instances.
    pub fn assign_instance_ids(&mut self) -> u32 {
        let mut count = 0;
        for block in &mut self.data {
            if block.is_empty() {
                block.instance_id = None;
            } else {
                block.instance_id = Some(count);
                count += 1;
            }
        }
        count
    }

    /// Number of non-empty blocks.
    pub fn solid_count(&self) -> usize {
        self.data.iter().filter(|b| !b.is_empty()).count()
    }
}

impl BlockQuery for VoxelWorld {
    fn get_block(&self, coord: VoxelCoord) -> Option<Block> {
        self.index(coord).map(|i| self.data[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> VoxelWorld {
        VoxelWorld::new(WorldSize {
            width: 4,
            height: 3,
        })
    }

    #[test]
    fn test_new_world_is_empty() {
        let world = small();
        assert_eq!(world.solid_count(), 0);
        assert_eq!(world.get_block(VoxelCoord::new(0, 0, 0)), Some(Block::EMPTY));
    }

    #[test]
    fn test_out_of_bounds_query_returns_none() {
        let world = small();
        assert_eq!(world.get_block(VoxelCoord::new(-1, 0, 0)), None);
        assert_eq!(world.get_block(VoxelCoord::new(4, 0, 0)), None);
        assert_eq!(world.get_block(VoxelCoord::new(0, 3, 0)), None);
        assert_eq!(world.get_block(VoxelCoord::new(0, 0, 4)), None);
        assert!(!world.is_solid(VoxelCoord::new(100, 100, 100)));
    }

    #[test]
    fn test_set_and_get_block() {
        let mut world = small();
        let c = VoxelCoord::new(3, 2, 1);
        world.set_block_id(c, BlockId::DIRT);
        assert_eq!(world.get_block(c).map(|b| b.id), Some(BlockId::DIRT));
        assert!(world.is_solid(c));
        assert!(!world.is_solid(VoxelCoord::new(1, 2, 3)));
    }

    #[test]
    fn test_out_of_bounds_write_is_ignored() {
        let mut world = small();
        world.set_block_id(VoxelCoord::new(-1, 0, 0), BlockId::GRASS);
        world.set_block_instance_id(VoxelCoord::new(0, 9, 0), Some(3));
        assert_eq!(world.solid_count(), 0);
    }

    #[test]
    fn test_instance_ids_follow_xyz_order() {
        let mut world = small();
        world.set_block_id(VoxelCoord::new(2, 0, 0), BlockId::GRASS);
        world.set_block_id(VoxelCoord::new(0, 1, 0), BlockId::GRASS);
        world.set_block_id(VoxelCoord::new(0, 0, 3), BlockId::GRASS);

        assert_eq!(world.assign_instance_ids(), 3);
        let slot = |x, y, z| world.get_block(VoxelCoord::new(x, y, z)).unwrap().instance_id;
        assert_eq!(slot(0, 0, 3), Some(0));
        assert_eq!(slot(0, 1, 0), Some(1));
        assert_eq!(slot(2, 0, 0), Some(2));
        assert_eq!(slot(1, 1, 1), None);
    }
}
