//! Vector, rotation and transform types shared by every pipeline stage.
//!
//! These lean on `nalgebra`, the same crate `rpfm_lib::files::bmd` uses
//! for its own matrix-formatted transforms.

use getset::{CopyGetters, Getters};
use nalgebra::{Matrix3, Rotation3, Vector3 as NaVector3};
use serde_derive::{Deserialize, Serialize};

use crate::constants::tolerance;

/// World-space point or direction, right-handed, Y-up, in meters.
pub type Vector3 = NaVector3<f64>;

/// Axis-aligned bounding box over the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Aabb2D {
    min_x: f64,
    min_z: f64,
    max_x: f64,
    max_z: f64,
}

impl Aabb2D {
    pub fn new(min_x: f64, min_z: f64, max_x: f64, max_z: f64) -> Self {
        Self { min_x, min_z, max_x, max_z }
    }

    /// Smallest box enclosing a set of XZ points. Returns `None` for an
    /// empty iterator.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let &(x0, z0) = it.next()?;
        let mut bounds = Self::new(x0, z0, x0, z0);
        for &(x, z) in it {
            bounds.min_x = bounds.min_x.min(x);
            bounds.min_z = bounds.min_z.min(z);
            bounds.max_x = bounds.max_x.max(x);
            bounds.max_z = bounds.max_z.max(z);
        }
        Some(bounds)
    }

    /// Grows the box outward by `amount` meters on every side.
    pub fn inflated(&self, amount: f64) -> Self {
        Self::new(self.min_x - amount, self.min_z - amount, self.max_x + amount, self.max_z + amount)
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.min_x + self.max_x) / 2.0, (self.min_z + self.max_z) / 2.0)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }

    pub fn aspect_ratio(&self) -> f64 {
        let (w, d) = (self.width(), self.depth());
        if d.abs() < f64::EPSILON { f64::INFINITY } else { w / d }
    }

    pub fn contains(&self, x: f64, z: f64) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    /// Area of the XZ intersection between this box and `other`, zero
    /// if they don't overlap.
    pub fn intersection_area(&self, other: &Self) -> f64 {
        let ix = (self.max_x.min(other.max_x) - self.min_x.max(other.min_x)).max(0.0);
        let iz = (self.max_z.min(other.max_z) - self.min_z.max(other.min_z)).max(0.0);
        ix * iz
    }
}

/// Axis-aligned bounding box in full 3D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct Aabb3D {
    #[getset(get_copy = "pub")]
    min: Vector3,
    #[getset(get_copy = "pub")]
    max: Vector3,
}

impl Aabb3D {
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) / 2.0
    }

    pub fn xz(&self) -> Aabb2D {
        Aabb2D::new(self.min.x, self.min.z, self.max.x, self.max.z)
    }
}

/// Euler angles in degrees, intrinsic order Y→X→Z (yaw, then pitch,
/// then roll), matching the source engine's convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Rotation {
    pub const IDENTITY: Self = Self { pitch: 0.0, yaw: 0.0, roll: 0.0 };

    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Adds a yaw offset, wrapping into `[0, 360)`.
    pub fn with_extra_yaw(&self, extra_yaw_degrees: f64) -> Self {
        let yaw = (self.yaw + extra_yaw_degrees).rem_euclid(360.0);
        Self { yaw, ..*self }
    }

    /// Converts to a 3x3 orthonormal basis `(right, up, forward)`.
    ///
    /// The source engine's basis at identity rotation is `right = +X`,
    /// `up = +Y`, `forward = +Z`; rotation is applied intrinsically as
    /// yaw (about Y) then pitch (about the rotated X) then roll (about
    /// the rotated Z).
    pub fn to_basis(self) -> (Vector3, Vector3, Vector3) {
        let ry = Rotation3::from_axis_angle(&NaVector3::y_axis(), self.yaw.to_radians());
        let rx = Rotation3::from_axis_angle(&NaVector3::x_axis(), self.pitch.to_radians());
        let rz = Rotation3::from_axis_angle(&NaVector3::z_axis(), self.roll.to_radians());
        let r = ry * rx * rz;

        let right = r * NaVector3::x();
        let up = r * NaVector3::y();
        let forward = r * NaVector3::z();
        (right, up, forward)
    }

    /// Recovers a `Rotation` from an orthonormal basis built by
    /// [`Rotation::to_basis`]. Used by the Coordinate Rebaser when it
    /// needs to pre-rotate an existing rotation by an axis remap's yaw.
    pub fn from_basis(right: Vector3, up: Vector3, forward: Vector3) -> Self {
        let m = Matrix3::from_columns(&[right, up, forward]);
        let r = Rotation3::from_matrix_unchecked(m);
        let (pitch_rad, yaw_rad, roll_rad) = r.euler_angles();
        Self::new(pitch_rad.to_degrees(), yaw_rad.to_degrees(), roll_rad.to_degrees())
    }
}

/// Position + rotation of a placed object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vector3,
    pub rotation: Rotation,
}

impl Transform {
    pub fn new(position: Vector3, rotation: Rotation) -> Self {
        Self { position, rotation }
    }

    /// The 12 values emitted for this transform: 9 basis components in
    /// column-major order, then position.
    pub fn matrix_values(&self) -> [f64; 12] {
        let (right, up, forward) = self.rotation.to_basis();
        [
            right.x, right.y, right.z,
            up.x, up.y, up.z,
            forward.x, forward.y, forward.z,
            self.position.x, self.position.y, self.position.z,
        ]
    }

    /// True if the rotation's basis is orthonormal within tolerance.
    pub fn is_orthonormal(&self) -> bool {
        let (right, up, forward) = self.rotation.to_basis();
        let unit = |v: Vector3| (v.norm() - 1.0).abs() < tolerance::ORTHONORMALITY;
        let perp = |a: Vector3, b: Vector3| a.dot(&b).abs() < tolerance::ORTHONORMALITY;
        unit(right) && unit(up) && unit(forward) && perp(right, up) && perp(up, forward) && perp(forward, right)
    }
}

/// Formats a float the way the Scene Emitter needs: up to
/// `decimal_places` digits after the point, trailing zeros trimmed,
/// negative zero collapsed to `0`.
pub fn format_number(value: f64, decimal_places: usize) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    let formatted = format!("{value:.decimal_places$}");
    let trimmed = trim_trailing_zeros(&formatted);
    if trimmed == "-0" { "0".to_string() } else { trimmed }
}

fn trim_trailing_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    let trimmed = s.trim_end_matches('0');
    let trimmed = trimmed.trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" { "0".to_string() } else { trimmed.to_string() }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identity_rotation_basis_is_orthonormal() {
        let t = Transform::new(Vector3::new(1.0, 2.0, 3.0), Rotation::IDENTITY);
        assert!(t.is_orthonormal());
        assert_eq!(t.matrix_values(), [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn ninety_degree_yaw_is_orthonormal() {
        let r = Rotation::new(0.0, 90.0, 0.0);
        let t = Transform::new(Vector3::new(0.0, 0.0, 0.0), r);
        assert!(t.is_orthonormal());
    }

    #[test]
    fn format_number_trims_and_collapses_negative_zero() {
        assert_eq!(format_number(1.0, 6), "1");
        assert_eq!(format_number(-0.0, 6), "0");
        assert_eq!(format_number(1.500000, 6), "1.5");
        assert_eq!(format_number(0.123456789, 6), "0.123457");
    }
}
