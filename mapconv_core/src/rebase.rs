//! Coordinate Rebaser: moves every source-map position into the
//! target terrain's frame, applying the chosen axis remap and
//! re-centering on the source map's own centroid.

use crate::geometry::{Rotation, Transform, Vector3};
use crate::orientation::AxisRemap;

/// Carries the two pieces of state every rebase needs: which remap to
/// apply, and where the source map's own center sits so translations
/// are relative to it rather than the source's raw origin.
#[derive(Debug, Clone, Copy)]
pub struct Rebaser {
    remap: AxisRemap,
    source_center: Vector3,
    target_center: Vector3,
}

impl Rebaser {
    pub fn new(remap: AxisRemap, source_centroid_xz: (f64, f64), target_center: Vector3) -> Self {
        Self { remap, source_center: Vector3::new(source_centroid_xz.0, 0.0, source_centroid_xz.1), target_center }
    }

    /// Remaps `p`, recenters it around the source centroid, then
    /// translates it onto the target terrain's center.
    pub fn rebase_point(&self, p: Vector3) -> Vector3 {
        let remapped = self.remap.apply(p);
        let remapped_center = self.remap.apply(self.source_center);
        let relative = remapped - remapped_center;
        Vector3::new(
            relative.x + self.target_center.x,
            p.y + self.target_center.y,
            relative.z + self.target_center.z,
        )
    }

    /// Rebases a full transform: the position as [`Rebaser::rebase_point`],
    /// the rotation pre-rotated by the remap's yaw contribution.
    pub fn rebase_transform(&self, transform: Transform) -> Transform {
        Transform::new(self.rebase_point(transform.position), self.rebase_rotation(transform.rotation))
    }

    pub fn rebase_rotation(&self, rotation: Rotation) -> Rotation {
        rotation.with_extra_yaw(self.remap.yaw_offset_degrees())
    }
}
