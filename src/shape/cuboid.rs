use crate::math::{Point, Real, Vector};
use crate::shape::{RawMesh, ShapeError};
use crate::transformation::orient_triangles;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A user-supplied velocity field, evaluated once per surface node.
pub type VelocityField = Arc<dyn Fn(&Point<Real>) -> Vector<Real> + Send + Sync>;

/// A parallelepiped spanned by `p0` and the three corners `p1`, `p2`, `p3`
/// reached along its edges, meshed with `grid_k + 1` structured nodes per
/// direction on each face.
///
/// Nodes shared between adjacent faces (edges and corners of the box) exist
/// exactly once; the six faces are triangulated by index arithmetic, two
/// triangles per grid cell.
#[derive(Clone)]
pub struct Cuboid {
    /// Base corner.
    pub p0: Point<Real>,
    /// Corner reached from `p0` along the first edge.
    pub p1: Point<Real>,
    /// Corner reached from `p0` along the second edge.
    pub p2: Point<Real>,
    /// Corner reached from `p0` along the third edge.
    pub p3: Point<Real>,
    /// Number of grid cells along `p1 - p0`.
    pub grid1: u32,
    /// Number of grid cells along `p2 - p0`.
    pub grid2: u32,
    /// Number of grid cells along `p3 - p0`.
    pub grid3: u32,
    /// Velocity prescribed on the surface; zero when absent.
    pub velocity_field: Option<VelocityField>,
}

impl fmt::Debug for Cuboid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cuboid")
            .field("p0", &self.p0)
            .field("p1", &self.p1)
            .field("p2", &self.p2)
            .field("p3", &self.p3)
            .field("grid1", &self.grid1)
            .field("grid2", &self.grid2)
            .field("grid3", &self.grid3)
            .field("velocity_field", &self.velocity_field.is_some())
            .finish()
    }
}

impl Cuboid {
    /// A cuboid spanned by four corner points.
    pub fn new(
        p0: Point<Real>,
        p1: Point<Real>,
        p2: Point<Real>,
        p3: Point<Real>,
        grid1: u32,
        grid2: u32,
        grid3: u32,
    ) -> Self {
        Cuboid {
            p0,
            p1,
            p2,
            p3,
            grid1,
            grid2,
            grid3,
            velocity_field: None,
        }
    }

    /// An axis-aligned cuboid whose top face lies in the xy-plane, centered
    /// on the origin, extending down to `z = -size.z`.
    pub fn axis_aligned(sizes: Vector<Real>, grids: (u32, u32, u32)) -> Self {
        let (sx, sy, sz) = (sizes.x, sizes.y, sizes.z);
        Cuboid::new(
            Point::new(-sx / 2.0, -sy / 2.0, -sz),
            Point::new(sx / 2.0, -sy / 2.0, -sz),
            Point::new(-sx / 2.0, sy / 2.0, -sz),
            Point::new(-sx / 2.0, -sy / 2.0, 0.0),
            grids.0,
            grids.1,
            grids.2,
        )
    }

    /// Prescribes a surface velocity field.
    pub fn with_velocity_field(mut self, field: VelocityField) -> Self {
        self.velocity_field = Some(field);
        self
    }

    /// Generates the closed box mesh.
    pub fn generate(&self) -> Result<RawMesh, ShapeError> {
        if self.grid1 == 0 || self.grid2 == 0 || self.grid3 == 0 {
            return Err(ShapeError::InvalidGrid("cuboid"));
        }

        let dp1 = self.p1 - self.p0;
        let dp2 = self.p2 - self.p0;
        let dp3 = self.p3 - self.p0;
        if dp1.cross(&dp2).dot(&dp3).abs() < 1.0e-12 {
            return Err(ShapeError::DegenerateCorners("cuboid"));
        }

        let origin = self.p0 + 0.5 * (dp1 + dp2 + dp3);
        let (g1, g2, g3) = (self.grid1, self.grid2, self.grid3);

        let mut coordinates: Vec<Point<Real>> = Vec::new();
        let mut node_ids: HashMap<(u32, u32, u32), u32> = HashMap::new();
        let p0 = self.p0;
        let mut node = |i: u32, j: u32, k: u32| -> u32 {
            *node_ids.entry((i, j, k)).or_insert_with(|| {
                let pt = p0
                    + dp1 * (i as Real / g1 as Real)
                    + dp2 * (j as Real / g2 as Real)
                    + dp3 * (k as Real / g3 as Real);
                coordinates.push(pt);
                (coordinates.len() - 1) as u32
            })
        };

        let mut triangles: Vec<[u32; 3]> = Vec::new();
        let mut quad = |a: u32, b: u32, c: u32, d: u32| {
            // a---b
            // |   |   split along the a-d diagonal
            // c---d
            triangles.push([a, c, d]);
            triangles.push([d, b, a]);
        };

        // The two faces orthogonal to each lattice direction, in a fixed
        // order so the node numbering is deterministic.
        for k in [0, g3] {
            for i in 0..g1 {
                for j in 0..g2 {
                    quad(
                        node(i, j, k),
                        node(i + 1, j, k),
                        node(i, j + 1, k),
                        node(i + 1, j + 1, k),
                    );
                }
            }
        }
        for j in [0, g2] {
            for i in 0..g1 {
                for k in 0..g3 {
                    quad(
                        node(i, j, k),
                        node(i + 1, j, k),
                        node(i, j, k + 1),
                        node(i + 1, j, k + 1),
                    );
                }
            }
        }
        for i in [0, g1] {
            for j in 0..g2 {
                for k in 0..g3 {
                    quad(
                        node(i, j, k),
                        node(i, j + 1, k),
                        node(i, j, k + 1),
                        node(i, j + 1, k + 1),
                    );
                }
            }
        }

        let velocities = match &self.velocity_field {
            Some(field) => coordinates.iter().map(|pt| field(pt)).collect(),
            None => vec![Vector::zeros(); coordinates.len()],
        };

        orient_triangles(&origin, &coordinates, &mut triangles)?;

        Ok(RawMesh {
            coordinates,
            velocities,
            triangles,
        })
    }
}
