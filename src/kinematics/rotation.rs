use crate::math::{Matrix, Real, Rotation, Vector};
use na::Unit;

/// Axes and angles smaller than this are treated as degenerate and map to the
/// identity rotation.
const EPS: Real = 1.0e-8;

/// Returns the rotation matrix rotating by `angle` (radians) around `axis`.
///
/// The matrix is built through the unit quaternion of the axis-angle pair.
/// `axis` does not need to be normalized. An `angle` smaller than `1.0e-8`
/// in absolute value yields the identity.
pub fn rotation_matrix(angle: Real, axis: &Vector<Real>) -> Matrix<Real> {
    if angle.abs() < EPS {
        return Matrix::identity();
    }

    let quaternion = Rotation::from_axis_angle(&Unit::new_normalize(*axis), angle);
    quaternion.to_rotation_matrix().into_inner()
}

/// Returns `vector` rotated by `angle` (radians) around `axis`.
///
/// A zero axis (norm smaller than `1.0e-8`) returns the vector unchanged.
pub fn rotate_vector(vector: &Vector<Real>, angle: Real, axis: &Vector<Real>) -> Vector<Real> {
    if axis.norm() < EPS {
        return *vector;
    }

    rotation_matrix(angle, axis) * vector
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Vector;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn quarter_turn_around_z() {
        let rotated = rotate_vector(&Vector::new(1.0, 0.0, 0.0), FRAC_PI_2, &Vector::new(0.0, 0.0, 2.0));
        assert_relative_eq!(rotated, Vector::new(0.0, 1.0, 0.0), epsilon = 1.0e-12);
    }

    #[test]
    fn zero_axis_is_a_noop() {
        let v = Vector::new(1.0, 2.0, 3.0);
        assert_eq!(rotate_vector(&v, 1.0, &Vector::zeros()), v);
    }

    #[test]
    fn rotation_matrix_is_orthonormal() {
        let rot = rotation_matrix(0.83, &Vector::new(1.0, -2.0, 0.5));
        assert_relative_eq!(rot.determinant(), 1.0, epsilon = 1.0e-12);
        assert_relative_eq!(rot * rot.transpose(), crate::math::Matrix::identity(), epsilon = 1.0e-12);
    }
}
