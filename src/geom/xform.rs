//! Xform op implementation.
//!
//! An [`XformOp`] is one atomic affine operation (translate, rotate, scale,
//! orient or a full matrix) whose payload may be time-sampled. A node's local
//! transform is the product of its ops in authored order,
//! `M_local = M_op1 * M_op2 * ...`, using glam's column-vector convention: the
//! last op is applied to points first.

use crate::core::{TimeCode, TimeSamples};
use crate::util::{DMat4, DQuat, DVec3};
use std::fmt;

/// Determinants smaller than this make an inverse op singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Transform operation type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum XformOpType {
    Translate,
    Scale,
    RotateX,
    RotateY,
    RotateZ,
    RotateEuler(RotationOrder),
    Rotate,    // axis + angle
    Orient,
    Transform,
}

impl fmt::Display for XformOpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translate => write!(f, "translate"),
            Self::Scale => write!(f, "scale"),
            Self::RotateX => write!(f, "rotateX"),
            Self::RotateY => write!(f, "rotateY"),
            Self::RotateZ => write!(f, "rotateZ"),
            Self::RotateEuler(order) => write!(f, "rotate{:?}", order),
            Self::Rotate => write!(f, "rotate"),
            Self::Orient => write!(f, "orient"),
            Self::Transform => write!(f, "transform"),
        }
    }
}

/// Application order of a three-angle Euler rotation.
///
/// `XYZ` rotates about X first, then Y, then Z. The angle vector always holds
/// the X, Y and Z angles in its x, y and z components regardless of order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RotationOrder {
    XYZ,
    XZY,
    YXZ,
    YZX,
    ZXY,
    ZYX,
}

impl RotationOrder {
    /// Axis indices in application order.
    pub fn axes(&self) -> [usize; 3] {
        match self {
            Self::XYZ => [0, 1, 2],
            Self::XZY => [0, 2, 1],
            Self::YXZ => [1, 0, 2],
            Self::YZX => [1, 2, 0],
            Self::ZXY => [2, 0, 1],
            Self::ZYX => [2, 1, 0],
        }
    }
}

/// Problem found while evaluating an op. Evaluation still yields a matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OpDefect {
    /// Scale with a zero component; the matrix is not invertible.
    ZeroScale(DVec3),
    /// Inverse op whose matrix cannot be inverted; identity is used instead.
    SingularInverse,
}

/// Op payload, each variant possibly time-sampled.
#[derive(Clone, Debug, PartialEq)]
pub enum XformOpKind {
    Translate(TimeSamples<DVec3>),
    Scale(TimeSamples<DVec3>),
    /// Angle in degrees.
    RotateX(TimeSamples<f64>),
    /// Angle in degrees.
    RotateY(TimeSamples<f64>),
    /// Angle in degrees.
    RotateZ(TimeSamples<f64>),
    /// Per-axis angles in degrees, interpolated per axis.
    RotateEuler {
        order: RotationOrder,
        angles: TimeSamples<DVec3>,
    },
    /// Angle in degrees about a fixed axis.
    Rotate {
        axis: DVec3,
        angle: TimeSamples<f64>,
    },
    /// Quaternion, interpolated with slerp.
    Orient(TimeSamples<DQuat>),
    /// Full matrix, interpolated component-wise.
    Transform(TimeSamples<DMat4>),
}

/// A single transform operation.
#[derive(Clone, Debug, PartialEq)]
pub struct XformOp {
    pub kind: XformOpKind,
    /// Apply the inverse of the op's matrix.
    pub inverse: bool,
}

impl XformOp {
    fn new(kind: XformOpKind) -> Self {
        Self { kind, inverse: false }
    }

    /// Create a translate operation.
    pub fn translate(v: impl Into<TimeSamples<DVec3>>) -> Self {
        Self::new(XformOpKind::Translate(v.into()))
    }

    /// Create a scale operation.
    pub fn scale(v: impl Into<TimeSamples<DVec3>>) -> Self {
        Self::new(XformOpKind::Scale(v.into()))
    }

    /// Create a rotation around X axis (angle in degrees).
    pub fn rotate_x(angle: impl Into<TimeSamples<f64>>) -> Self {
        Self::new(XformOpKind::RotateX(angle.into()))
    }

    /// Create a rotation around Y axis (angle in degrees).
    pub fn rotate_y(angle: impl Into<TimeSamples<f64>>) -> Self {
        Self::new(XformOpKind::RotateY(angle.into()))
    }

    /// Create a rotation around Z axis (angle in degrees).
    pub fn rotate_z(angle: impl Into<TimeSamples<f64>>) -> Self {
        Self::new(XformOpKind::RotateZ(angle.into()))
    }

    /// Create an XYZ Euler rotation (angles in degrees).
    pub fn rotate_xyz(angles: impl Into<TimeSamples<DVec3>>) -> Self {
        Self::rotate_euler(RotationOrder::XYZ, angles)
    }

    /// Create an Euler rotation with an explicit order (angles in degrees).
    pub fn rotate_euler(order: RotationOrder, angles: impl Into<TimeSamples<DVec3>>) -> Self {
        Self::new(XformOpKind::RotateEuler {
            order,
            angles: angles.into(),
        })
    }

    /// Create a rotation about an arbitrary axis (angle in degrees).
    pub fn rotate(axis: DVec3, angle: impl Into<TimeSamples<f64>>) -> Self {
        Self::new(XformOpKind::Rotate {
            axis,
            angle: angle.into(),
        })
    }

    /// Create an orientation from a quaternion.
    pub fn orient(q: impl Into<TimeSamples<DQuat>>) -> Self {
        Self::new(XformOpKind::Orient(q.into()))
    }

    /// Create a 4x4 matrix operation (glam column-major).
    pub fn transform(m: impl Into<TimeSamples<DMat4>>) -> Self {
        Self::new(XformOpKind::Transform(m.into()))
    }

    /// Create a matrix operation from 16 row-major values with the
    /// translation in the last row, as scene description files store them.
    pub fn transform_row_major(values: [f64; 16]) -> Self {
        // Row-vector layout transposed into glam's column-vector layout
        Self::transform(DMat4::from_cols_array(&values).transpose())
    }

    /// Mark this op as contributing its inverse.
    pub fn inverted(mut self) -> Self {
        self.inverse = true;
        self
    }

    /// Get the op type.
    pub fn op_type(&self) -> XformOpType {
        match &self.kind {
            XformOpKind::Translate(_) => XformOpType::Translate,
            XformOpKind::Scale(_) => XformOpType::Scale,
            XformOpKind::RotateX(_) => XformOpType::RotateX,
            XformOpKind::RotateY(_) => XformOpType::RotateY,
            XformOpKind::RotateZ(_) => XformOpType::RotateZ,
            XformOpKind::RotateEuler { order, .. } => XformOpType::RotateEuler(*order),
            XformOpKind::Rotate { .. } => XformOpType::Rotate,
            XformOpKind::Orient(_) => XformOpType::Orient,
            XformOpKind::Transform(_) => XformOpType::Transform,
        }
    }

    /// Whether the op has more than one time sample.
    pub fn is_time_varying(&self) -> bool {
        match &self.kind {
            XformOpKind::Translate(v) | XformOpKind::Scale(v) => v.is_time_varying(),
            XformOpKind::RotateEuler { angles, .. } => angles.is_time_varying(),
            XformOpKind::RotateX(a) | XformOpKind::RotateY(a) | XformOpKind::RotateZ(a) => {
                a.is_time_varying()
            }
            XformOpKind::Rotate { angle, .. } => angle.is_time_varying(),
            XformOpKind::Orient(q) => q.is_time_varying(),
            XformOpKind::Transform(m) => m.is_time_varying(),
        }
    }

    /// Evaluate the op's matrix at `time`, ignoring defects.
    #[inline]
    pub fn matrix(&self, time: TimeCode) -> DMat4 {
        self.evaluate(time).0
    }

    /// Evaluate the op's matrix at `time` and report any defect.
    pub fn evaluate(&self, time: TimeCode) -> (DMat4, Option<OpDefect>) {
        let mut defect = None;

        let m = match &self.kind {
            XformOpKind::Translate(v) => DMat4::from_translation(v.eval(time)),
            XformOpKind::Scale(v) => {
                let s = v.eval(time);
                if s.x == 0.0 || s.y == 0.0 || s.z == 0.0 {
                    defect = Some(OpDefect::ZeroScale(s));
                }
                DMat4::from_scale(s)
            }
            XformOpKind::RotateX(a) => axis_rotation(0, a.eval(time)),
            XformOpKind::RotateY(a) => axis_rotation(1, a.eval(time)),
            XformOpKind::RotateZ(a) => axis_rotation(2, a.eval(time)),
            XformOpKind::RotateEuler { order, angles } => {
                let angles = angles.eval(time).to_array();
                // First axis applied first means it sits rightmost
                order
                    .axes()
                    .iter()
                    .fold(DMat4::IDENTITY, |acc, &axis| axis_rotation(axis, angles[axis]) * acc)
            }
            XformOpKind::Rotate { axis, angle } => {
                let axis = axis.normalize_or_zero();
                if axis.length_squared() > 0.0001 {
                    DMat4::from_axis_angle(axis, angle.eval(time).to_radians())
                } else {
                    DMat4::IDENTITY
                }
            }
            XformOpKind::Orient(q) => {
                let q = q.eval(time);
                if q.length_squared() > 0.0 {
                    DMat4::from_quat(q.normalize())
                } else {
                    DMat4::IDENTITY
                }
            }
            XformOpKind::Transform(m) => m.eval(time),
        };

        if !self.inverse {
            return (m, defect);
        }
        if m.determinant().abs() < SINGULAR_EPSILON {
            // Identity stands in for the op, which supersedes any other defect
            return (DMat4::IDENTITY, Some(OpDefect::SingularInverse));
        }
        (m.inverse(), defect)
    }
}

/// Rotation about a principal axis (0 = X, 1 = Y, 2 = Z), angle in degrees.
fn axis_rotation(axis: usize, degrees: f64) -> DMat4 {
    let radians = degrees.to_radians();
    match axis {
        0 => DMat4::from_rotation_x(radians),
        1 => DMat4::from_rotation_y(radians),
        _ => DMat4::from_rotation_z(radians),
    }
}

/// Compose ops in authored order into a local matrix.
///
/// Defects are passed to `on_defect` together with the index of the op.
pub fn compose_ops(
    ops: &[XformOp],
    time: TimeCode,
    mut on_defect: impl FnMut(usize, OpDefect),
) -> DMat4 {
    let mut result = DMat4::IDENTITY;
    for (i, op) in ops.iter().enumerate() {
        let (m, defect) = op.evaluate(time);
        if let Some(defect) = defect {
            on_defect(i, defect);
        }
        result = result * m;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_close(a: DVec3, b: DVec3) -> bool {
        a.abs_diff_eq(b, 1e-9)
    }

    #[test]
    fn test_empty_ops_identity() {
        let m = compose_ops(&[], TimeCode::Default, |_, _| panic!("no defects"));
        assert_eq!(m, DMat4::IDENTITY);
    }

    #[test]
    fn test_translate_then_scale() {
        let ops = [
            XformOp::translate(DVec3::new(10.0, 0.0, 0.0)),
            XformOp::scale(DVec3::splat(2.0)),
        ];
        let m = compose_ops(&ops, TimeCode::Default, |_, _| {});
        let p = m.transform_point3(DVec3::new(5.0, 0.0, 0.0));
        assert!(vec_close(p, DVec3::new(20.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rotate_z_right_handed() {
        let m = XformOp::rotate_z(90.0).matrix(TimeCode::Default);
        let v = m.transform_vector3(DVec3::X);
        assert!(vec_close(v, DVec3::Y));
    }

    #[test]
    fn test_rotate_euler_order() {
        // X by 90 then Z by 90: +Y -> +Z -> +Z
        let xyz = XformOp::rotate_xyz(DVec3::new(90.0, 0.0, 90.0)).matrix(TimeCode::Default);
        assert!(vec_close(xyz.transform_vector3(DVec3::Y), DVec3::Z));

        // Z by 90 then X by 90: +Y -> -X -> -X
        let zyx = XformOp::rotate_euler(RotationOrder::ZYX, DVec3::new(90.0, 0.0, 90.0))
            .matrix(TimeCode::Default);
        assert!(vec_close(zyx.transform_vector3(DVec3::Y), -DVec3::X));
    }

    #[test]
    fn test_rotate_axis_angle() {
        let m = XformOp::rotate(DVec3::new(0.0, 0.0, 3.0), 90.0).matrix(TimeCode::Default);
        assert!(vec_close(m.transform_vector3(DVec3::X), DVec3::Y));

        let zero_axis = XformOp::rotate(DVec3::ZERO, 90.0).matrix(TimeCode::Default);
        assert_eq!(zero_axis, DMat4::IDENTITY);
    }

    #[test]
    fn test_orient() {
        let q = DQuat::from_rotation_x(90f64.to_radians()) * 2.0;
        let m = XformOp::orient(q).matrix(TimeCode::Default);
        assert!(vec_close(m.transform_vector3(DVec3::Y), DVec3::Z));
    }

    #[test]
    fn test_transform_row_major() {
        let op = XformOp::transform_row_major([
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            7.0, 8.0, 9.0, 1.0,
        ]);
        let m = op.matrix(TimeCode::Default);
        assert_eq!(m.w_axis.truncate(), DVec3::new(7.0, 8.0, 9.0));
    }

    #[test]
    fn test_zero_scale_defect() {
        let (m, defect) = XformOp::scale(DVec3::new(1.0, 0.0, 1.0)).evaluate(TimeCode::Default);
        assert_eq!(defect, Some(OpDefect::ZeroScale(DVec3::new(1.0, 0.0, 1.0))));
        assert_eq!(m.transform_point3(DVec3::ONE), DVec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_inverse_op() {
        let op = XformOp::translate(DVec3::new(1.0, 2.0, 3.0)).inverted();
        let (m, defect) = op.evaluate(TimeCode::Default);
        assert!(defect.is_none());
        assert!(vec_close(m.transform_point3(DVec3::ZERO), DVec3::new(-1.0, -2.0, -3.0)));

        let singular = XformOp::scale(DVec3::ZERO).inverted();
        let (m, defect) = singular.evaluate(TimeCode::Default);
        assert_eq!(m, DMat4::IDENTITY);
        assert_eq!(defect, Some(OpDefect::SingularInverse));
    }

    #[test]
    fn test_inverted_flat_scale_reports_singular() {
        let op = XformOp::scale(DVec3::new(1.0, 0.0, 1.0)).inverted();
        let (m, defect) = op.evaluate(TimeCode::Default);
        assert_eq!(m, DMat4::IDENTITY);
        assert_eq!(defect, Some(OpDefect::SingularInverse));

        let flat = XformOp::transform(DMat4::from_scale(DVec3::new(2.0, 2.0, 0.0))).inverted();
        assert_eq!(flat.evaluate(TimeCode::Default).1, Some(OpDefect::SingularInverse));
    }

    #[test]
    fn test_sampled_matrix_lerps_componentwise() {
        let from = DMat4::from_translation(DVec3::new(0.0, 0.0, 0.0));
        let to = DMat4::from_scale_rotation_translation(
            DVec3::splat(3.0),
            DQuat::IDENTITY,
            DVec3::new(10.0, -4.0, 2.0),
        );
        let op = XformOp::transform(TimeSamples::from_samples([(0.0, from), (10.0, to)]).unwrap());
        assert!(op.is_time_varying());

        let mid = op.matrix(TimeCode::at(5.0));
        let expected = from * 0.5 + to * 0.5;
        assert!(mid.abs_diff_eq(expected, 1e-12));
        assert!(vec_close(mid.w_axis.truncate(), DVec3::new(5.0, -2.0, 1.0)));
        assert!(vec_close(mid.x_axis.truncate(), DVec3::new(2.0, 0.0, 0.0)));

        let quarter = op.matrix(TimeCode::at(2.5));
        assert!(vec_close(quarter.transform_point3(DVec3::X), DVec3::new(4.0, -1.0, 0.5)));

        // Clamped outside the sampled range
        assert_eq!(op.matrix(TimeCode::at(-1.0)), from);
        assert_eq!(op.matrix(TimeCode::at(20.0)), to);
    }

    #[test]
    fn test_sampled_translate() {
        let samples = TimeSamples::from_samples([
            (0.0, DVec3::ZERO),
            (10.0, DVec3::new(10.0, 0.0, 0.0)),
        ])
        .unwrap();
        let op = XformOp::translate(samples);
        assert!(op.is_time_varying());
        assert_eq!(op.op_type(), XformOpType::Translate);
        let p = op.matrix(TimeCode::at(2.5)).transform_point3(DVec3::ZERO);
        assert!(vec_close(p, DVec3::new(2.5, 0.0, 0.0)));
    }

    #[test]
    fn test_op_type_display() {
        assert_eq!(XformOp::rotate_xyz(DVec3::ZERO).op_type().to_string(), "rotateXYZ");
        assert_eq!(XformOp::translate(DVec3::ZERO).op_type().to_string(), "translate");
    }
}
