use crate::math::{Point, Real, Vector};
use crate::shape::{RawMesh, ShapeError};
use crate::transformation::orient_triangles;

/// Nodes farther than this from a density center are left untouched.
const CENTER_CUTOFF: Real = 20.0;

/// A flat rectangular slab ("plane" with thickness): one face spanned by the
/// corner points `p0 → p1` and `p0 → p2`, the opposite face offset by `width`
/// along the face normal, and a stitched side wall.
///
/// The mesh has `2·(grid1 + 1)·(grid2 + 1)` nodes. Optional `centers` locally
/// densify the grid by pulling interior nodes toward each center point, with
/// a hard cutoff radius of 20; nodes near the cutoff get sparser in exchange.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Plane {
    /// First corner of the upper face.
    pub p0: Point<Real>,
    /// Corner reached from `p0` along the first grid direction.
    pub p1: Point<Real>,
    /// Corner reached from `p0` along the second grid direction.
    pub p2: Point<Real>,
    /// Slab thickness, along `(p1 - p0) × (p2 - p0)`.
    pub width: Real,
    /// Number of grid cells along `p1 - p0`.
    pub grid1: u32,
    /// Number of grid cells along `p2 - p0`.
    pub grid2: u32,
    /// Points the mesh density is increased around.
    pub centers: Vec<Point<Real>>,
}

impl Plane {
    /// A slab spanned by three corner points.
    pub fn new(
        p0: Point<Real>,
        p1: Point<Real>,
        p2: Point<Real>,
        width: Real,
        grid1: u32,
        grid2: u32,
    ) -> Self {
        Plane {
            p0,
            p1,
            p2,
            width,
            grid1,
            grid2,
            centers: Vec::new(),
        }
    }

    /// An axis-aligned slab whose upper face spans
    /// `[-size_x/2, size_x/2] × [-size_y/2, size_y/2]` at `z = -width`.
    pub fn axis_aligned(size_x: Real, size_y: Real, width: Real, grid_x: u32, grid_y: u32) -> Self {
        Plane::new(
            Point::new(-size_x / 2.0, -size_y / 2.0, -width),
            Point::new(size_x / 2.0, -size_y / 2.0, -width),
            Point::new(-size_x / 2.0, size_y / 2.0, -width),
            width,
            grid_x,
            grid_y,
        )
    }

    /// Adds local densification centers.
    pub fn with_centers(mut self, centers: Vec<Point<Real>>) -> Self {
        self.centers = centers;
        self
    }

    /// Generates the closed slab mesh. Velocities are zero.
    pub fn generate(&self) -> Result<RawMesh, ShapeError> {
        if self.grid1 == 0 || self.grid2 == 0 {
            return Err(ShapeError::InvalidGrid("plane"));
        }

        let dp1 = self.p1 - self.p0;
        let dp2 = self.p2 - self.p0;
        let normal = dp1.cross(&dp2);
        if normal.norm() < 1.0e-12 {
            return Err(ShapeError::DegenerateCorners("plane"));
        }
        let dp3 = normal / normal.norm() * self.width;

        let origin = self.p0 + 0.5 * (dp1 + dp2 + dp3);
        let (grid1, grid2) = (self.grid1 as usize, self.grid2 as usize);
        let (n1, n2) = (grid1 + 1, grid2 + 1);

        // Lower face nodes first, upper face nodes after them.
        let fi1 = |i: usize, j: usize| (i * n2 + j) as u32;
        let fi2 = |i: usize, j: usize| (i * n2 + j + n1 * n2) as u32;

        let mut coordinates = vec![Point::origin(); 2 * n1 * n2];
        for i in 0..n1 {
            let alpha = i as Real / grid1 as Real;
            for j in 0..n2 {
                let beta = j as Real / grid2 as Real;
                let base = self.p0 + alpha * dp1 + beta * dp2;
                coordinates[fi1(i, j) as usize] = base;
                coordinates[fi2(i, j) as usize] = base + dp3;
            }
        }

        let mut triangles = Vec::with_capacity(4 * grid1 * grid2 + 4 * (grid1 + grid2));
        for i in 0..grid1 {
            for j in 0..grid2 {
                triangles.push([fi1(i, j), fi1(i + 1, j), fi1(i + 1, j + 1)]);
                triangles.push([fi2(i, j), fi2(i + 1, j + 1), fi2(i + 1, j)]);
                triangles.push([fi1(i, j), fi1(i + 1, j + 1), fi1(i, j + 1)]);
                triangles.push([fi2(i, j), fi2(i, j + 1), fi2(i + 1, j + 1)]);
            }
        }
        // Side walls along the two grid directions.
        for i in 0..grid1 {
            triangles.push([fi1(i, grid2), fi2(i + 1, grid2), fi1(i + 1, grid2)]);
            triangles.push([fi1(i, grid2), fi2(i, grid2), fi2(i + 1, grid2)]);
            triangles.push([fi1(i + 1, 0), fi1(i, 0), fi2(i, 0)]);
            triangles.push([fi1(i + 1, 0), fi2(i + 1, 0), fi2(i, 0)]);
        }
        for j in 0..grid2 {
            triangles.push([fi1(grid1, j + 1), fi1(grid1, j), fi2(grid1, j)]);
            triangles.push([fi1(grid1, j + 1), fi2(grid1, j), fi2(grid1, j + 1)]);
            triangles.push([fi1(0, j), fi2(0, j + 1), fi1(0, j + 1)]);
            triangles.push([fi1(0, j), fi2(0, j), fi2(0, j + 1)]);
        }

        // Pull interior nodes toward the densification centers. Boundary
        // nodes stay fixed so the slab outline is preserved.
        let pull = |d: Real| 0.7 * (d / CENTER_CUTOFF) + 0.3;
        for center in &self.centers {
            for i in 1..grid1 {
                for j in 1..grid2 {
                    for fi in [fi1(i, j), fi2(i, j)] {
                        let offset = coordinates[fi as usize] - center;
                        let dist = offset.norm();
                        if dist < CENTER_CUTOFF {
                            coordinates[fi as usize] = center + pull(dist) * offset;
                        }
                    }
                }
            }
        }

        orient_triangles(&origin, &coordinates, &mut triangles)?;

        let velocities = vec![Vector::zeros(); coordinates.len()];
        Ok(RawMesh {
            coordinates,
            velocities,
            triangles,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transformation::triangle_points_outward;

    #[test]
    fn node_and_triangle_counts() {
        let mesh = Plane::axis_aligned(2.0, 2.0, 0.5, 3, 4).generate().unwrap();
        assert!(mesh.is_consistent());
        assert_eq!(mesh.coordinates.len(), 2 * 4 * 5);
        assert_eq!(mesh.triangles.len(), 4 * 3 * 4 + 4 * (3 + 4));
    }

    #[test]
    fn all_triangles_point_outward() {
        let shape = Plane::axis_aligned(2.0, 2.0, 0.5, 3, 3);
        let mesh = shape.generate().unwrap();

        let dp1 = shape.p1 - shape.p0;
        let dp2 = shape.p2 - shape.p0;
        let dp3 = dp1.cross(&dp2).normalize() * shape.width;
        let origin = shape.p0 + 0.5 * (dp1 + dp2 + dp3);

        for (k, tri) in mesh.triangles.iter().enumerate() {
            let pts = [
                &mesh.coordinates[tri[0] as usize],
                &mesh.coordinates[tri[1] as usize],
                &mesh.coordinates[tri[2] as usize],
            ];
            assert!(triangle_points_outward(&origin, pts, k).unwrap());
        }
    }

    #[test]
    fn centers_pull_interior_nodes_only() {
        let plain = Plane::axis_aligned(10.0, 10.0, 1.0, 5, 5).generate().unwrap();
        let pulled = Plane::axis_aligned(10.0, 10.0, 1.0, 5, 5)
            .with_centers(vec![Point::new(0.0, 0.0, -1.0)])
            .generate()
            .unwrap();

        assert_eq!(plain.coordinates.len(), pulled.coordinates.len());
        // Corner nodes are untouched.
        assert_eq!(plain.coordinates[0], pulled.coordinates[0]);
        // At least one interior node moved toward the center.
        assert!(plain
            .coordinates
            .iter()
            .zip(pulled.coordinates.iter())
            .any(|(a, b)| a != b));
    }

    #[test]
    fn zero_grid_is_rejected() {
        assert!(matches!(
            Plane::axis_aligned(1.0, 1.0, 0.1, 0, 3).generate(),
            Err(ShapeError::InvalidGrid("plane"))
        ));
    }
}
