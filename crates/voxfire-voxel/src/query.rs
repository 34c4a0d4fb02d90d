//! The block lookup surface shared by player collision and projectiles.

use crate::block::Block;
use crate::coords::VoxelCoord;

/// Read-only block lookup.
///
/// Implementations return `None` for cells outside the world. Callers never
/// treat `None` as an error: a missing block is empty space.
pub trait BlockQuery {
    /// Block at the given cell, or `None` when out of bounds.
    fn get_block(&self, coord: VoxelCoord) -> Option<Block>;

    /// Returns `true` if the cell holds a non-empty block.
    fn is_solid(&self, coord: VoxelCoord) -> bool {
        self.get_block(coord).is_some_and(|b| !b.is_empty())
    }
}

impl<T: BlockQuery + ?Sized> BlockQuery for &T {
    fn get_block(&self, coord: VoxelCoord) -> Option<Block> {
        (**self).get_block(coord)
    }
}
