//! Rigid-body kinematics: axis-angle rotations and the [`Pose`] attached to
//! every node of a composed system.

pub use self::pose::Pose;
pub use self::rotation::{rotate_vector, rotation_matrix};

mod pose;
mod rotation;
