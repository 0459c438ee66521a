//! Math type re-exports and matrix decomposition helpers.
//!
//! All evaluation happens in double precision. The decomposition helpers
//! follow the convention of reading the basis vectors of the upper-left
//! 3x3 block: scale is the length of each basis vector and rotation is the
//! orthonormalized basis. This ignores shear, so a sheared matrix does not
//! round-trip through [`extract_scale`] / [`extract_rotation`].

pub use glam::{DMat3, DMat4, DQuat, DVec3, DVec4};

use std::fmt;

/// Basis vectors shorter than this are treated as collapsed.
pub const DEGENERATE_EPSILON: f64 = 1e-12;

/// Translation component (the `w` column) of an affine matrix.
#[inline]
pub fn extract_translation(m: &DMat4) -> DVec3 {
    m.w_axis.truncate()
}

/// Per-axis scale as the length of each basis vector.
///
/// Lossy: shear is folded into the lengths and the sign of a mirrored axis
/// is dropped.
#[inline]
pub fn extract_scale(m: &DMat4) -> DVec3 {
    DVec3::new(
        m.x_axis.truncate().length(),
        m.y_axis.truncate().length(),
        m.z_axis.truncate().length(),
    )
}

/// Rotation of the orthonormalized upper-left 3x3 block.
///
/// A mirrored basis (negative determinant) has its first axis flipped so the
/// result is always a proper rotation. A collapsed basis yields identity.
pub fn extract_rotation(m: &DMat4) -> Rotation {
    let basis = DMat3::from_mat4(*m);
    match orthonormalize(&basis) {
        Some(ortho) => Rotation::from_quat(DQuat::from_mat3(&ortho)),
        None => Rotation::IDENTITY,
    }
}

/// Gram-Schmidt orthonormalization of a 3x3 basis.
///
/// Returns `None` when two axes are collinear or any axis has zero length.
pub fn orthonormalize(basis: &DMat3) -> Option<DMat3> {
    let mut x = basis.x_axis;
    let y = basis.y_axis;

    if basis.determinant() < 0.0 {
        x = -x;
    }

    if x.length() < DEGENERATE_EPSILON {
        return None;
    }
    let x = x.normalize();

    let y = y - x * y.dot(x);
    if y.length() < DEGENERATE_EPSILON {
        return None;
    }
    let y = y.normalize();

    if basis.z_axis.length() < DEGENERATE_EPSILON {
        return None;
    }
    let z = x.cross(y);

    Some(DMat3::from_cols(x, y, z))
}

/// A 3D rotation stored as a unit quaternion.
#[derive(Clone, Copy, PartialEq)]
pub struct Rotation {
    quat: DQuat,
}

impl Rotation {
    /// No rotation.
    pub const IDENTITY: Self = Self { quat: DQuat::IDENTITY };

    /// Wrap a quaternion (normalized on entry).
    pub fn from_quat(quat: DQuat) -> Self {
        let quat = if quat.length_squared() > 0.0 {
            quat.normalize()
        } else {
            DQuat::IDENTITY
        };
        Self { quat }
    }

    /// Rotation of `degrees` about `axis` (right-hand rule).
    pub fn from_axis_angle(axis: DVec3, degrees: f64) -> Self {
        let axis = axis.normalize_or_zero();
        if axis == DVec3::ZERO {
            return Self::IDENTITY;
        }
        Self::from_quat(DQuat::from_axis_angle(axis, degrees.to_radians()))
    }

    /// The unit quaternion.
    #[inline]
    pub fn quat(&self) -> DQuat {
        self.quat
    }

    /// Rotation axis (unit length, +X for identity).
    pub fn axis(&self) -> DVec3 {
        self.quat.to_axis_angle().0
    }

    /// Rotation angle about [`Rotation::axis`] in degrees.
    pub fn angle_degrees(&self) -> f64 {
        self.quat.to_axis_angle().1.to_degrees()
    }

    /// Rotation as a 3x3 matrix.
    pub fn matrix(&self) -> DMat3 {
        DMat3::from_quat(self.quat)
    }

    /// Rotate a vector.
    #[inline]
    pub fn rotate(&self, v: DVec3) -> DVec3 {
        self.quat * v
    }

    /// Compare two rotations, treating `q` and `-q` as equal.
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f64) -> bool {
        self.quat.abs_diff_eq(other.quat, max_abs_diff)
            || self.quat.abs_diff_eq(-other.quat, max_abs_diff)
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (axis, angle) = self.quat.to_axis_angle();
        write!(f, "Rotation(axis: {:?}, degrees: {})", axis, angle.to_degrees())
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axis = self.axis();
        write!(f, "[({}, {}, {}) {}]", axis.x, axis.y, axis.z, self.angle_degrees())
    }
}
