//! Axis-aligned bounding boxes.

use glam::Vec3;
use voxfire_voxel::VoxelCoord;

/// Axis-aligned box given by its minimum and maximum corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from its corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Player box whose top face sits at `eye`.
    pub fn from_eye(eye: Vec3, half_width: f32, height: f32) -> Self {
        Self {
            min: Vec3::new(eye.x - half_width, eye.y - height, eye.z - half_width),
            max: Vec3::new(eye.x + half_width, eye.y, eye.z + half_width),
        }
    }

    /// The unit box occupied by a voxel cell.
    pub fn cell(coord: VoxelCoord) -> Self {
        Self {
            min: coord.min_corner(),
            max: coord.max_corner(),
        }
    }

    /// Strict overlap on all three axes. Touching faces do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// The box moved by `offset`.
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Every integer cell the box touches, in ascending x, then y, then z.
    pub fn cells(&self) -> impl Iterator<Item = VoxelCoord> + use<> {
        let lo = VoxelCoord::from_world(self.min);
        let hi = VoxelCoord::from_world(self.max);
        (lo.x..=hi.x).flat_map(move |x| {
            (lo.y..=hi.y).flat_map(move |y| (lo.z..=hi.z).map(move |z| VoxelCoord::new(x, y, z)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_eye_top_at_eye() {
        let b = Aabb::from_eye(Vec3::new(5.0, 10.0, 5.0), 0.25, 1.8);
        assert_eq!(b.max.y, 10.0);
        assert!((b.min.y - 8.2).abs() < 1e-5);
        assert_eq!(b.min.x, 4.75);
        assert_eq!(b.max.z, 5.25);
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let a = Aabb::cell(VoxelCoord::new(0, 0, 0));
        let b = Aabb::cell(VoxelCoord::new(1, 0, 0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&a.translated(Vec3::splat(0.5))));
    }

    #[test]
    fn test_cells_enumeration_order() {
        let b = Aabb::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.5, 1.5, 1.5));
        let cells: Vec<_> = b.cells().collect();
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[0], VoxelCoord::new(0, 0, 0));
        assert_eq!(cells[1], VoxelCoord::new(0, 0, 1));
        assert_eq!(cells[2], VoxelCoord::new(0, 1, 0));
        assert_eq!(cells[4], VoxelCoord::new(1, 0, 0));
        assert_eq!(cells[7], VoxelCoord::new(1, 1, 1));
    }

    #[test]
    fn test_cells_cover_negative_coordinates() {
        let b = Aabb::new(Vec3::new(-0.5, 0.2, 0.2), Vec3::new(0.5, 0.8, 0.8));
        let cells: Vec<_> = b.cells().collect();
        assert_eq!(
            cells,
            vec![VoxelCoord::new(-1, 0, 0), VoxelCoord::new(0, 0, 0)]
        );
    }
}
