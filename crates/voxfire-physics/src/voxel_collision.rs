//! Minimum-penetration box-vs-voxel resolution.
//!
//! [`resolve_block`] is a pure function: given the player box and one solid
//! cell it returns the corrected box and the single axis it was pushed along.
//! [`resolve_against_world`] folds it over every cell the box touched at the
//! start of the frame. Cells already visited are not re-tested after a later
//! push, so deep multi-block corners can leave some residual overlap until the
//! next frame.

use glam::Vec3;
use voxfire_voxel::{BlockQuery, VoxelCoord};

use crate::aabb::Aabb;

/// A world axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis (vertical).
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// Component index into a `Vec3`.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Which way along an axis the box is pushed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushDirection {
    /// Toward −axis.
    Negative,
    /// Toward +axis.
    Positive,
}

/// The push chosen for one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisHit {
    /// Axis of the push.
    pub axis: Axis,
    /// Direction of the push.
    pub direction: PushDirection,
    /// Push distance (always positive).
    pub depth: f32,
}

impl AxisHit {
    /// Returns `true` for a push straight up, i.e. the box landed on the cell.
    pub fn is_upward(&self) -> bool {
        self.axis == Axis::Y && self.direction == PushDirection::Positive
    }

    /// Displacement that applies this push.
    pub fn offset(&self) -> Vec3 {
        let signed = match self.direction {
            PushDirection::Negative => -self.depth,
            PushDirection::Positive => self.depth,
        };
        let mut offset = Vec3::ZERO;
        offset[self.axis.index()] = signed;
        offset
    }
}

/// Pushes `aabb` out of `cell` along the axis of least positive penetration.
///
/// Returns `None` when the box does not overlap the cell. Candidates are
/// considered in the order −x, +x, −y, +y, −z, +z and a later candidate only
/// wins with a strictly smaller depth.
pub fn resolve_block(aabb: &Aabb, cell: VoxelCoord) -> Option<(Aabb, AxisHit)> {
    let block = Aabb::cell(cell);
    if !aabb.overlaps(&block) {
        return None;
    }

    let candidates = [
        (Axis::X, PushDirection::Negative, aabb.max.x - block.min.x),
        (Axis::X, PushDirection::Positive, block.max.x - aabb.min.x),
        (Axis::Y, PushDirection::Negative, aabb.max.y - block.min.y),
        (Axis::Y, PushDirection::Positive, block.max.y - aabb.min.y),
        (Axis::Z, PushDirection::Negative, aabb.max.z - block.min.z),
        (Axis::Z, PushDirection::Positive, block.max.z - aabb.min.z),
    ];

    let mut best: Option<AxisHit> = None;
    for (axis, direction, depth) in candidates {
        if depth <= 0.0 {
            continue;
        }
        if best.is_none_or(|b| depth < b.depth) {
            best = Some(AxisHit {
                axis,
                direction,
                depth,
            });
        }
    }

    best.map(|hit| (aabb.translated(hit.offset()), hit))
}

/// Outcome of resolving a box against the world for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// Box after every push.
    pub aabb: Aabb,
    /// Pushes in the order they were applied.
    pub hits: Vec<AxisHit>,
}

impl Resolution {
    /// Total displacement applied to the box.
    pub fn offset_from(&self, original: &Aabb) -> Vec3 {
        self.aabb.min - original.min
    }

    /// Returns `true` if any push was upward.
    pub fn landed(&self) -> bool {
        self.hits.iter().any(AxisHit::is_upward)
    }
}

/// Resolves `aabb` against every solid cell it touched at the start of the
/// frame, in ascending x, y, z order, re-deriving the box after each push.
pub fn resolve_against_world<W: BlockQuery + ?Sized>(aabb: &Aabb, world: &W) -> Resolution {
    let mut current = *aabb;
    let mut hits = Vec::new();

    for cell in aabb.cells() {
        if !world.is_solid(cell) {
            continue;
        }
        if let Some((corrected, hit)) = resolve_block(&current, cell) {
            tracing::trace!("Resolved {cell:?} along {:?} by {:.4}", hit.axis, hit.depth);
            current = corrected;
            hits.push(hit);
        }
    }

    Resolution {
        aabb: current,
        hits,
    }
}
