//! Mesh-level transformations: convex-hull triangulation, constrained
//! Delaunay triangulation of planar domains, and surface-orientation fixing.

pub use self::convex_hull::{convex_hull_indices, ConvexHullError};
pub use self::delaunay::{
    circle_point_count, ellipse_boundary_point_count, points_on_ellipse, triangulate_circle,
    triangulate_ellipse, triangulate_refined, DelaunayError,
};
pub use self::orient::{orient_triangles, triangle_points_outward, OrientationError};

mod convex_hull;
mod delaunay;
mod orient;
