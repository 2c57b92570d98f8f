use crate::math::{Matrix, Point, Real, Vector};
use crate::shape::{RawMesh, ShapeError};
use crate::transformation::{convex_hull_indices, orient_triangles};
use std::f64::consts::PI;

/// An ellipsoid centered at the origin, described by the lengths of its three
/// semi-axes and the directions of the first two principal axes.
///
/// The surface is sampled on a near-uniform angular grid and triangulated by
/// the convex hull of the samples (valid because the surface is convex about
/// the origin). Rigid-body motion can be attached directly to the generator;
/// surface velocities then follow `v = -(p × ω) + v_lin`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Ellipsoid {
    /// Semi-axis lengths.
    pub lengths: Vector<Real>,
    /// Direction of the first principal axis.
    pub axe1: Vector<Real>,
    /// Direction of the second principal axis.
    pub axe2: Vector<Real>,
    /// Angular resolution: number of polar rings. The mesh has `grid²` nodes
    /// (`grid² + 1` when `grid` is odd).
    pub grid: u32,
    /// Linear velocity of the rigid body.
    pub velocity: Vector<Real>,
    /// Angular velocity of the rigid body, about the origin.
    pub angular: Vector<Real>,
}

impl Ellipsoid {
    /// An ellipsoid with the given semi-axis lengths, principal axes aligned
    /// with x and y, and no motion.
    pub fn new(lengths: Vector<Real>, grid: u32) -> Self {
        Ellipsoid {
            lengths,
            axe1: Vector::x(),
            axe2: Vector::y(),
            grid,
            velocity: Vector::zeros(),
            angular: Vector::zeros(),
        }
    }

    /// A sphere of the given radius.
    pub fn sphere(radius: Real, grid: u32) -> Self {
        Self::new(Vector::repeat(radius), grid)
    }

    /// Sets the directions of the first two principal axes.
    pub fn with_axes(mut self, axe1: Vector<Real>, axe2: Vector<Real>) -> Self {
        self.axe1 = axe1;
        self.axe2 = axe2;
        self
    }

    /// Attaches a rigid-body motion to the generator.
    pub fn with_motion(mut self, velocity: Vector<Real>, angular: Vector<Real>) -> Self {
        self.velocity = velocity;
        self.angular = angular;
        self
    }

    /// Generates the triangulated surface mesh of this ellipsoid.
    pub fn generate(&self) -> Result<RawMesh, ShapeError> {
        if self.grid == 0 {
            return Err(ShapeError::InvalidGrid("ellipsoid"));
        }
        if self.lengths.iter().any(|&l| l <= 0.0) {
            return Err(ShapeError::InvalidLengths);
        }

        let shape_matrix = spheroid_matrix(&self.lengths, &self.axe1, &self.axe2)?;
        let coordinates = surface_samples(self.grid, &shape_matrix);

        let velocities = coordinates
            .iter()
            .map(|pt| -pt.coords.cross(&self.angular) + self.velocity)
            .collect();

        let mut triangles = convex_hull_indices(&coordinates)?;
        orient_triangles(&Point::origin(), &coordinates, &mut triangles)?;

        Ok(RawMesh {
            coordinates,
            velocities,
            triangles,
        })
    }
}

/// The matrix `A` of the implicit spheroid surface `xᵀ·A·x = 1`, built from
/// the semi-axis lengths (eigenvalues `1/length²`) and the principal axes.
///
/// `axe2` is re-derived as `axe1 × (axe1 × axe2)` so the frame stays
/// orthogonal even for non-orthogonal inputs; note this flips `axe2` for
/// already-orthogonal inputs, which is harmless for the quadric.
fn spheroid_matrix(
    lengths: &Vector<Real>,
    axe1: &Vector<Real>,
    axe2: &Vector<Real>,
) -> Result<Matrix<Real>, ShapeError> {
    let eigenvalues = Matrix::from_diagonal(&lengths.map(|l| 1.0 / (l * l)));

    let axe3 = axe1.cross(axe2);
    if axe3.norm() < 1.0e-12 {
        return Err(ShapeError::DegenerateAxes);
    }
    let axe2 = axe1.cross(&axe3);

    let axe1 = axe1.normalize();
    let axe2 = axe2.normalize();
    let axe3 = axe3.normalize();

    let p = Matrix::from_columns(&[axe1, axe2, axe3]);
    let p_inv = p.try_inverse().ok_or(ShapeError::DegenerateAxes)?;

    Ok(p * eigenvalues * p_inv)
}

/// Number of azimuthal samples on each polar ring.
///
/// The asymmetric branch (`4i + 2` ascending, `4(n - i) - 2` descending) is
/// what produces the near-uniform coverage; the exact arithmetic is load-
/// bearing because the hull triangulation is sensitive to the sample
/// distribution.
fn ring_counts(n: u32) -> Vec<u32> {
    (0..n)
        .map(|i| if 2 * i < n { 4 * i + 2 } else { 4 * (n - i) - 2 })
        .collect()
}

/// Samples the spheroid surface on the angular grid, ring by ring.
fn surface_samples(grid: u32, shape_matrix: &Matrix<Real>) -> Vec<Point<Real>> {
    let mut coordinates = Vec::new();

    for (i, &m) in ring_counts(grid).iter().enumerate() {
        let theta = PI / grid as Real * (i as Real + 0.5);
        for j in 0..m {
            let phi = 2.0 * PI / m as Real * (j as Real + 0.5);
            let unit = Vector::new(
                theta.sin() * phi.cos(),
                phi.sin() * theta.sin(),
                theta.cos(),
            );
            let radius = 1.0 / unit.dot(&(shape_matrix * unit)).sqrt();
            coordinates.push(Point::from(unit * radius));
        }
    }

    coordinates
}
