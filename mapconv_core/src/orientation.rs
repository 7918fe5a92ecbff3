//! Orientation Solver: picks the axis remap that best aligns a
//! source map's bounds with a target terrain's bounds.

use serde_derive::{Deserialize, Serialize};

use crate::constants::tolerance;
use crate::geometry::{Aabb2D, Vector3};

/// A signed permutation of the XZ axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisRemap {
    Identity,
    SwapXZ,
    NegateX,
    NegateZ,
    SwapAndNegateX,
    SwapAndNegateZ,
}

/// All six candidates, in the order used to break a scoring tie.
pub const ALL_REMAPS: [AxisRemap; 6] = [
    AxisRemap::Identity,
    AxisRemap::SwapXZ,
    AxisRemap::NegateX,
    AxisRemap::NegateZ,
    AxisRemap::SwapAndNegateX,
    AxisRemap::SwapAndNegateZ,
];

impl AxisRemap {
    /// Applies this remap to a world position, leaving Y untouched.
    pub fn apply(self, p: Vector3) -> Vector3 {
        let (x, z) = match self {
            AxisRemap::Identity => (p.x, p.z),
            AxisRemap::SwapXZ => (p.z, p.x),
            AxisRemap::NegateX => (-p.x, p.z),
            AxisRemap::NegateZ => (p.x, -p.z),
            AxisRemap::SwapAndNegateX => (-p.z, p.x),
            AxisRemap::SwapAndNegateZ => (p.z, -p.x),
        };
        Vector3::new(x, p.y, z)
    }

    /// The additional yaw (degrees, about Y) this remap contributes as
    /// a pre-rotation: 90/180/270 for a swap, or a
    /// mirror with a sign flip for a pure negate.
    pub fn yaw_offset_degrees(self) -> f64 {
        match self {
            AxisRemap::Identity => 0.0,
            AxisRemap::SwapXZ => 90.0,
            AxisRemap::NegateX => 180.0,
            AxisRemap::NegateZ => 0.0,
            AxisRemap::SwapAndNegateX => 270.0,
            AxisRemap::SwapAndNegateZ => 90.0,
        }
    }

    /// The inverse remap, such that `r.inverse().apply(r.apply(p)) == p`.
    pub fn inverse(self) -> AxisRemap {
        match self {
            AxisRemap::Identity => AxisRemap::Identity,
            AxisRemap::SwapXZ => AxisRemap::SwapXZ,
            AxisRemap::NegateX => AxisRemap::NegateX,
            AxisRemap::NegateZ => AxisRemap::NegateZ,
            AxisRemap::SwapAndNegateX => AxisRemap::SwapAndNegateZ,
            AxisRemap::SwapAndNegateZ => AxisRemap::SwapAndNegateX,
        }
    }

    fn tie_break_rank(self) -> usize {
        ALL_REMAPS.iter().position(|r| *r == self).unwrap()
    }
}

fn bounds_after_remap(source_bounds: Aabb2D, remap: AxisRemap, target_center: (f64, f64)) -> Aabb2D {
    let corners = [
        (source_bounds.min_x(), source_bounds.min_z()),
        (source_bounds.min_x(), source_bounds.max_z()),
        (source_bounds.max_x(), source_bounds.min_z()),
        (source_bounds.max_x(), source_bounds.max_z()),
    ];

    let source_center = source_bounds.center();
    let remapped_center = remap.apply(Vector3::new(source_center.0, 0.0, source_center.1));

    let remapped_corners: Vec<(f64, f64)> = corners
        .iter()
        .map(|&(x, z)| {
            let r = remap.apply(Vector3::new(x, 0.0, z));
            (r.x - remapped_center.x + target_center.0, r.z - remapped_center.z + target_center.1)
        })
        .collect();

    Aabb2D::from_points(remapped_corners.iter()).expect("four corners is never empty")
}

/// Chooses the axis remap that best aligns `source_bounds` with
/// `target_bounds`, scored by XZ intersection area minus an
/// aspect-ratio mismatch penalty.
pub fn solve_orientation(source_bounds: Aabb2D, target_bounds: Aabb2D) -> AxisRemap {
    let target_center = target_bounds.center();
    let target_aspect = target_bounds.aspect_ratio();

    let mut scored: Vec<(AxisRemap, f64)> = ALL_REMAPS
        .iter()
        .map(|&remap| {
            let remapped = bounds_after_remap(source_bounds, remap, target_center);
            let intersection = remapped.intersection_area(&target_bounds);
            let penalty = (remapped.aspect_ratio() - target_aspect).abs();
            (remap, intersection - penalty)
        })
        .collect();

    scored.sort_by(|(remap_a, score_a), (remap_b, score_b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| remap_a.tie_break_rank().cmp(&remap_b.tie_break_rank()))
    });

    let best_score = scored[0].1;
    scored
        .into_iter()
        .filter(|(_, score)| (best_score - score).abs() / best_score.abs().max(1.0) <= tolerance::ORIENTATION_TIE)
        .min_by_key(|(remap, _)| remap.tie_break_rank())
        .map(|(remap, _)| remap)
        .unwrap_or(AxisRemap::Identity)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identity_composed_with_inverse_is_identity() {
        let p = Vector3::new(12.5, 3.0, -7.25);
        for remap in ALL_REMAPS {
            let round_tripped = remap.inverse().apply(remap.apply(p));
            assert!((round_tripped - p).norm() < 1e-6, "{remap:?} failed round trip");
        }
    }

    #[test]
    fn swap_xz_is_chosen_for_rotated_source() {
        let source = Aabb2D::new(-100.0, -300.0, 100.0, 300.0); // 200 wide x 600 deep
        let target = Aabb2D::new(-300.0, -100.0, 300.0, 100.0); // 600 wide x 200 deep
        assert_eq!(solve_orientation(source, target), AxisRemap::SwapXZ);
    }

    #[test]
    fn identity_preferred_when_shapes_already_match() {
        let source = Aabb2D::new(-100.0, -100.0, 100.0, 100.0);
        let target = Aabb2D::new(-100.0, -100.0, 100.0, 100.0);
        assert_eq!(solve_orientation(source, target), AxisRemap::Identity);
    }
}
