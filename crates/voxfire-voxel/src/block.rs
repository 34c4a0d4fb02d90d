//! Block identity.

use serde::{Deserialize, Serialize};

/// Compact block type identifier. `0` is reserved for empty space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u16);

impl BlockId {
    /// The empty sentinel.
    pub const EMPTY: BlockId = BlockId(0);
    /// Grass, the only block the terrain generator places.
    pub const GRASS: BlockId = BlockId(1);
    /// Dirt.
    pub const DIRT: BlockId = BlockId(2);

    /// Returns `true` for the empty sentinel.
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

/// One cell of the world grid.
///
/// `instance_id` is the slot this block occupies in the instanced render
/// mesh, assigned by [`VoxelWorld::assign_instance_ids`](crate::VoxelWorld::assign_instance_ids).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block type.
    pub id: BlockId,
    /// Render instance slot, if the block has been meshed.
    pub instance_id: Option<u32>,
}

impl Block {
    /// An empty block.
    pub const EMPTY: Block = Block {
        id: BlockId::EMPTY,
        instance_id: None,
    };

    /// A block of the given type with no render slot.
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            instance_id: None,
        }
    }

    /// Returns `true` if this block does not occupy its cell.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}
