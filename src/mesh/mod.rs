//! The fused, flat mesh handed to the solver: coordinates, velocities,
//! triangles, and the named index ranges identifying each body.

pub use self::triangulation::{IndexRange, Triangulation};

mod triangulation;
