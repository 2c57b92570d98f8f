use crate::math::{Matrix, Point, Real, Vector};

/// The rigid-body state attached to a node of a composed system: a rotation
/// and a translation, plus the linear and angular velocity of the node.
///
/// Poses are applied to a mesh in a fixed order: rotate the coordinates,
/// adapt the velocities, translate the coordinates. Translating *last* is
/// what makes the angular-velocity contribution `ω × p` act about the shape's
/// own origin rather than its final position.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Pose {
    /// The rotation applied to the subtree.
    pub rotation: Matrix<Real>,
    /// The translation applied to the subtree, after the rotation.
    pub translation: Vector<Real>,
    /// The linear velocity of the subtree.
    pub velocity: Vector<Real>,
    /// The angular velocity of the subtree, about its pre-translation origin.
    pub angular: Vector<Real>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// The identity pose: no motion, no displacement.
    pub fn identity() -> Self {
        Pose {
            rotation: Matrix::identity(),
            translation: Vector::zeros(),
            velocity: Vector::zeros(),
            angular: Vector::zeros(),
        }
    }

    /// A pure translation.
    pub fn translated(translation: Vector<Real>) -> Self {
        Pose {
            translation,
            ..Pose::identity()
        }
    }

    /// Sets the rotation of this pose.
    pub fn with_rotation(mut self, rotation: Matrix<Real>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the translation of this pose.
    pub fn with_translation(mut self, translation: Vector<Real>) -> Self {
        self.translation = translation;
        self
    }

    /// Sets the linear and angular velocity of this pose.
    pub fn with_motion(mut self, velocity: Vector<Real>, angular: Vector<Real>) -> Self {
        self.velocity = velocity;
        self.angular = angular;
        self
    }

    /// Applies this pose to a set of coordinates and their velocities.
    ///
    /// The order is significant and must not be reordered or merged:
    /// 1. rotate every coordinate;
    /// 2. replace every velocity by `R·v + v_lin + ω × p`, where `p` is the
    ///    rotated but not-yet-translated coordinate;
    /// 3. translate every coordinate.
    pub fn apply(&self, coordinates: &mut [Point<Real>], velocities: &mut [Vector<Real>]) {
        for pt in coordinates.iter_mut() {
            *pt = Point::from(self.rotation * pt.coords);
        }

        for (vel, pt) in velocities.iter_mut().zip(coordinates.iter()) {
            *vel = self.rotation * *vel + self.velocity + self.angular.cross(&pt.coords);
        }

        for pt in coordinates.iter_mut() {
            pt.coords += self.translation;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn angular_velocity_acts_about_the_origin() {
        // A point at (1, 0, 0) spinning with ω = (0, 0, 3) moves with +3 in y,
        // no matter where the pose translates the shape afterwards.
        let pose = Pose::translated(Vector::new(10.0, 0.0, 0.0))
            .with_motion(Vector::zeros(), Vector::new(0.0, 0.0, 3.0));
        let mut coords = vec![Point::new(1.0, 0.0, 0.0)];
        let mut vels = vec![Vector::zeros()];
        pose.apply(&mut coords, &mut vels);

        assert_eq!(coords[0], Point::new(11.0, 0.0, 0.0));
        assert_relative_eq!(vels[0], Vector::new(0.0, 3.0, 0.0), epsilon = 1.0e-12);
    }

    #[test]
    fn rotation_applies_to_velocities_too() {
        let rot = crate::kinematics::rotation_matrix(std::f64::consts::FRAC_PI_2, &Vector::z());
        let pose = Pose::identity().with_rotation(rot);
        let mut coords = vec![Point::new(1.0, 0.0, 0.0)];
        let mut vels = vec![Vector::new(1.0, 0.0, 0.0)];
        pose.apply(&mut coords, &mut vels);

        assert_relative_eq!(coords[0], Point::new(0.0, 1.0, 0.0), epsilon = 1.0e-12);
        assert_relative_eq!(vels[0], Vector::new(0.0, 1.0, 0.0), epsilon = 1.0e-12);
    }
}
