//! Shape generators: every shape produces a [`RawMesh`] — parallel arrays of
//! coordinates and per-node velocities plus a triangle index list — from its
//! geometric parameters alone.

pub use self::cuboid::{Cuboid, VelocityField};
pub use self::disk::{Disk, SideLayers};
pub use self::ellipsoid::Ellipsoid;
pub use self::flagellum::{Flagellum, Flagellum2, FlagellumVel, FlagellumVelNorm};
pub use self::plane::Plane;
pub use self::refine2d::Refinement;

mod cuboid;
mod disk;
mod ellipsoid;
mod flagellum;
mod plane;
mod refine2d;

use crate::math::{Point, Real, Vector};
use crate::transformation::{ConvexHullError, DelaunayError, OrientationError};

/// The direct output of a shape generator.
///
/// Invariant: `coordinates` and `velocities` have the same length, and every
/// triangle index is smaller than `coordinates.len()`. Points that no
/// triangle references are allowed.
#[derive(Clone, Debug, Default)]
pub struct RawMesh {
    /// The mesh node positions.
    pub coordinates: Vec<Point<Real>>,
    /// The velocity of each node.
    pub velocities: Vec<Vector<Real>>,
    /// Triangles as triples of indices into `coordinates`, zero-based.
    pub triangles: Vec<[u32; 3]>,
}

impl RawMesh {
    /// Checks the structural invariant of this mesh.
    pub fn is_consistent(&self) -> bool {
        self.coordinates.len() == self.velocities.len()
            && self
                .triangles
                .iter()
                .all(|tri| tri.iter().all(|&i| (i as usize) < self.coordinates.len()))
    }
}

/// Errors raised by the shape generators.
///
/// All of these are fatal for the compilation of the system they occur in: no
/// partial mesh is ever emitted, and no geometry-affecting default is ever
/// silently substituted.
#[derive(thiserror::Error, Debug)]
pub enum ShapeError {
    /// A grid resolution was zero.
    #[error("the grid resolution of a {0} must be a positive integer")]
    InvalidGrid(&'static str),
    /// The principal axes of an ellipsoid are collinear.
    #[error("the principal axes of an ellipsoid must not be collinear")]
    DegenerateAxes,
    /// An ellipsoid semi-axis length was zero or negative.
    #[error("ellipsoid semi-axis lengths must be positive")]
    InvalidLengths,
    /// The three corner points defining a plane are collinear.
    #[error("the corner points of a {0} span a degenerate surface")]
    DegenerateCorners(&'static str),
    /// A length-like parameter was zero or negative.
    #[error("the {0} must be positive")]
    NonPositive(&'static str),
    /// A time step of zero was given to a finite-difference velocity source.
    #[error("the finite-difference time step must be non-zero")]
    InvalidTimeStep,
    /// A flagellum centerline is too short to build a tube around.
    #[error("a flagellum centerline needs at least {needed} points, got {got}")]
    CenterlineTooShort {
        /// Minimum number of centerline points for this flagellum variant.
        needed: usize,
        /// Number of points actually provided.
        got: usize,
    },
    /// Parallel per-centerline-point arrays have different lengths.
    #[error("flagellum {0} must have one entry per centerline point")]
    MismatchedCenterline(&'static str),
    /// Two 2D refinement regions touch or overlap.
    #[error("refinement regions collide; they must be pairwise disjoint")]
    RefinementCollision,
    /// Convex-hull triangulation failed.
    #[error(transparent)]
    ConvexHull(#[from] ConvexHullError),
    /// Planar Delaunay triangulation failed.
    #[error(transparent)]
    Delaunay(#[from] DelaunayError),
    /// The orientation normalizer hit a degenerate triangle.
    #[error(transparent)]
    Orientation(#[from] OrientationError),
}

/// A declarative description of one meshable body.
#[derive(Clone, Debug)]
pub enum ShapeSpec {
    /// An ellipsoid or sphere, hull-triangulated.
    Ellipsoid(Ellipsoid),
    /// A flat rectangular slab with two structured faces.
    Plane(Plane),
    /// A parallelepiped with six structured faces.
    Cuboid(Cuboid),
    /// A flat circular disk meshed by constrained Delaunay triangulation.
    Disk(Disk),
    /// A tube around a moving centerline, velocities finite-differenced from
    /// two configurations.
    Flagellum(Flagellum),
    /// A tube around a centerline with explicit material frames, velocities
    /// finite-differenced per surface node.
    Flagellum2(Flagellum2),
    /// A tube with explicit per-centerline-point velocities.
    FlagellumVel(FlagellumVel),
    /// A tube with explicit velocities plus the material-frame rotation
    /// correction (planar beats only).
    FlagellumVelNorm(FlagellumVelNorm),
}

impl ShapeSpec {
    /// The name of this shape kind, for error context and logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ShapeSpec::Ellipsoid(_) => "ellipsoid",
            ShapeSpec::Plane(_) => "plane",
            ShapeSpec::Cuboid(_) => "cuboid",
            ShapeSpec::Disk(_) => "disk",
            ShapeSpec::Flagellum(_) => "flagellum",
            ShapeSpec::Flagellum2(_) => "flagellum2",
            ShapeSpec::FlagellumVel(_) => "flagellumVel",
            ShapeSpec::FlagellumVelNorm(_) => "flagellumVelNorm",
        }
    }

    /// Runs the generator of this shape.
    pub fn generate(&self) -> Result<RawMesh, ShapeError> {
        match self {
            ShapeSpec::Ellipsoid(shape) => shape.generate(),
            ShapeSpec::Plane(shape) => shape.generate(),
            ShapeSpec::Cuboid(shape) => shape.generate(),
            ShapeSpec::Disk(shape) => shape.generate(),
            ShapeSpec::Flagellum(shape) => shape.generate(),
            ShapeSpec::Flagellum2(shape) => shape.generate(),
            ShapeSpec::FlagellumVel(shape) => shape.generate(),
            ShapeSpec::FlagellumVelNorm(shape) => shape.generate(),
        }
    }
}

impl From<Ellipsoid> for ShapeSpec {
    fn from(shape: Ellipsoid) -> Self {
        ShapeSpec::Ellipsoid(shape)
    }
}

impl From<Plane> for ShapeSpec {
    fn from(shape: Plane) -> Self {
        ShapeSpec::Plane(shape)
    }
}

impl From<Cuboid> for ShapeSpec {
    fn from(shape: Cuboid) -> Self {
        ShapeSpec::Cuboid(shape)
    }
}

impl From<Disk> for ShapeSpec {
    fn from(shape: Disk) -> Self {
        ShapeSpec::Disk(shape)
    }
}

impl From<Flagellum> for ShapeSpec {
    fn from(shape: Flagellum) -> Self {
        ShapeSpec::Flagellum(shape)
    }
}

impl From<Flagellum2> for ShapeSpec {
    fn from(shape: Flagellum2) -> Self {
        ShapeSpec::Flagellum2(shape)
    }
}

impl From<FlagellumVel> for ShapeSpec {
    fn from(shape: FlagellumVel) -> Self {
        ShapeSpec::FlagellumVel(shape)
    }
}

impl From<FlagellumVelNorm> for ShapeSpec {
    fn from(shape: FlagellumVelNorm) -> Self {
        ShapeSpec::FlagellumVelNorm(shape)
    }
}
