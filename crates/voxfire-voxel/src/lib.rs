//! Voxel world storage and the block query surface consumed by collision.
//!
//! Block id 0 is the empty sentinel; everything else is solid. Queries outside
//! the world return `None`, which callers treat the same as an empty block.

pub mod block;
pub mod coords;
pub mod query;
pub mod terrain;
pub mod world;

pub use block::{Block, BlockId};
pub use coords::VoxelCoord;
pub use query::BlockQuery;
pub use terrain::{TerrainParams, generate_terrain};
pub use world::{VoxelWorld, WorldSize};
