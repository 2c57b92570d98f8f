use crate::math::{Point, Point2, Real, Vector};
use crate::shape::{RawMesh, Refinement, ShapeError};
use crate::transformation::{circle_point_count, orient_triangles, points_on_ellipse, triangulate_refined};

/// How many intermediate node rings to insert in the side wall of a [`Disk`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum SideLayers {
    /// Derive the count from the boundary spacing: inter-layer spacing is
    /// bounded by twice the boundary point spacing, which keeps the side-wall
    /// triangle angles within the quality bound of the face meshes.
    Auto,
    /// A fixed number of intermediate rings.
    Fixed(u32),
}

/// A flat circular disk of finite thickness ("sandwich"): a quality-meshed
/// top face at `z = 0`, a bottom face at `z = -width`, and a side wall
/// stitched between the two boundary rings.
///
/// The top face (and, by default, the mirrored bottom face) is meshed by
/// constrained Delaunay triangulation with a maximum triangle area and a
/// minimum angle of 20°. Nested [`Refinement`] regions locally increase the
/// density.
#[derive(Clone, Debug)]
pub struct Disk {
    /// Disk radius.
    pub radius: Real,
    /// Disk thickness.
    pub width: Real,
    /// Maximum triangle area of the face meshes.
    pub max_area: Real,
    /// Side-wall layering.
    pub side_layers: SideLayers,
    /// Optional local refinement of the faces.
    pub refinement: Option<Refinement>,
    /// Whether the bottom face mirrors the refined top face, or is meshed
    /// independently from the plain boundary ring.
    pub refine_bottom: bool,
}

impl Disk {
    /// A disk with no refinement and no extra side layers.
    pub fn new(radius: Real, width: Real, max_area: Real) -> Self {
        Disk {
            radius,
            width,
            max_area,
            side_layers: SideLayers::Fixed(0),
            refinement: None,
            refine_bottom: true,
        }
    }

    /// Sets the side-wall layering.
    pub fn with_side_layers(mut self, side_layers: SideLayers) -> Self {
        self.side_layers = side_layers;
        self
    }

    /// Adds a local refinement of the faces.
    pub fn with_refinement(mut self, refinement: Refinement) -> Self {
        self.refinement = Some(refinement);
        self
    }

    /// Chooses whether the bottom face mirrors the refined top face.
    pub fn with_bottom_refinement(mut self, refine_bottom: bool) -> Self {
        self.refine_bottom = refine_bottom;
        self
    }

    /// Generates the closed disk mesh. Velocities are zero.
    pub fn generate(&self) -> Result<RawMesh, ShapeError> {
        if self.radius <= 0.0 {
            return Err(ShapeError::NonPositive("disk radius"));
        }
        if self.width <= 0.0 {
            return Err(ShapeError::NonPositive("disk width"));
        }
        if self.max_area <= 0.0 {
            return Err(ShapeError::NonPositive("disk max_area"));
        }

        // Boundary ring shared by the faces and the side wall.
        let n_ring = circle_point_count(self.radius, self.max_area);
        let ring = points_on_ellipse(n_ring, self.radius, self.radius, 0.0, Point2::origin(), 0.0);

        let mut seeds = ring.clone();
        if let Some(refinement) = &self.refinement {
            seeds.extend(refinement.produce_points()?);
        }

        let (top2d, trias_top) = triangulate_refined(&seeds, n_ring, self.max_area)?;
        let num_top = top2d.len();

        let mut coordinates: Vec<Point<Real>> = top2d
            .iter()
            .map(|pt| Point::new(pt.x, pt.y, 0.0))
            .collect();

        let mut triangles = trias_top.clone();

        // Bottom face: mirror of the (refined) top, or an independent plain
        // mesh when the refinement is only wanted on one side.
        if self.refine_bottom || self.refinement.is_none() {
            coordinates.extend(
                top2d
                    .iter()
                    .map(|pt| Point::new(pt.x, pt.y, -self.width)),
            );
            triangles.extend(
                trias_top
                    .iter()
                    .map(|tri| tri.map(|i| i + num_top as u32)),
            );
        } else {
            let (bot2d, trias_bot) = triangulate_refined(&ring, n_ring, self.max_area)?;
            coordinates.extend(
                bot2d
                    .iter()
                    .map(|pt| Point::new(pt.x, pt.y, -self.width)),
            );
            triangles.extend(trias_bot.iter().map(|tri| tri.map(|i| i + num_top as u32)));
        }
        let num_faces = coordinates.len();

        // Intermediate side-wall rings.
        let spacing = (ring[1] - ring[0]).norm();
        let layers = match self.side_layers {
            SideLayers::Fixed(count) => count as usize,
            SideLayers::Auto => side_layer_count(self.width, spacing),
        };
        for k in 1..=layers {
            let z = -self.width * k as Real / (layers + 1) as Real;
            coordinates.extend(ring.iter().map(|pt| Point::new(pt.x, pt.y, z)));
        }

        // Stitch: top boundary ring → intermediate rings → bottom boundary
        // ring. The face meshes keep their seed numbering, so the top ring is
        // nodes 0..n_ring and the bottom ring starts at num_top.
        let mut first = 0u32;
        let mut second = num_faces as u32;
        for _ in 0..layers {
            connect_rings(first, second, n_ring as u32, &mut triangles);
            first = second;
            second += n_ring as u32;
        }
        connect_rings(first, num_top as u32, n_ring as u32, &mut triangles);

        let origin = Point::new(0.0, 0.0, -self.width / 2.0);
        orient_triangles(&origin, &coordinates, &mut triangles)?;

        let velocities = vec![Vector::zeros(); coordinates.len()];
        Ok(RawMesh {
            coordinates,
            velocities,
            triangles,
        })
    }
}

/// Number of intermediate side-wall rings keeping the inter-layer spacing
/// below twice the boundary point spacing.
fn side_layer_count(width: Real, boundary_spacing: Real) -> usize {
    let spacing = boundary_spacing * 2.0;
    ((width / spacing - 1.0).floor().max(0.0)) as usize
}

/// Connects two rings of `count` nodes starting at `first` and `second` with
/// a closed band of triangles.
fn connect_rings(first: u32, second: u32, count: u32, out: &mut Vec<[u32; 3]>) {
    for k in 0..count - 1 {
        out.push([first + k, first + k + 1, second + k]);
        out.push([second + k + 1, second + k, first + k + 1]);
    }
    out.push([first + count - 1, first, second + count - 1]);
    out.push([second, second + count - 1, first]);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transformation::triangle_points_outward;

    #[test]
    fn disk_is_a_closed_oriented_surface() {
        let mesh = Disk::new(1.0, 0.4, 0.05).generate().unwrap();
        assert!(mesh.is_consistent());

        let origin = Point::new(0.0, 0.0, -0.2);
        for (k, tri) in mesh.triangles.iter().enumerate() {
            let pts = [
                &mesh.coordinates[tri[0] as usize],
                &mesh.coordinates[tri[1] as usize],
                &mesh.coordinates[tri[2] as usize],
            ];
            assert!(triangle_points_outward(&origin, pts, k).unwrap());
        }

        // Every edge of a closed surface is shared by exactly two triangles.
        let mut edge_uses = std::collections::BTreeMap::new();
        for tri in &mesh.triangles {
            for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                let key = (tri[a].min(tri[b]), tri[a].max(tri[b]));
                *edge_uses.entry(key).or_insert(0u32) += 1;
            }
        }
        assert!(edge_uses.values().all(|&uses| uses == 2));
    }

    #[test]
    fn boundary_ring_is_shared_with_the_side_wall() {
        let disk = Disk::new(2.0, 0.5, 0.1);
        let n_ring = circle_point_count(disk.radius, disk.max_area);
        let mesh = disk.generate().unwrap();

        for pt in &mesh.coordinates[..n_ring] {
            assert_relative_eq!(pt.coords.xy().norm(), 2.0, epsilon = 1.0e-9);
            assert_eq!(pt.z, 0.0);
        }
    }

    #[test]
    fn auto_side_layers_bound_the_spacing() {
        // Thick disk: the auto mode must insert intermediate rings.
        assert_eq!(side_layer_count(10.0, 0.5), 9);
        // Thin disk: none needed.
        assert_eq!(side_layer_count(0.2, 0.5), 0);

        let thin = Disk::new(1.0, 0.1, 0.05)
            .with_side_layers(SideLayers::Auto)
            .generate()
            .unwrap();
        let thick = Disk::new(1.0, 3.0, 0.05)
            .with_side_layers(SideLayers::Auto)
            .generate()
            .unwrap();
        assert!(thick.coordinates.len() > thin.coordinates.len());
    }

    #[test]
    fn refinement_adds_nodes_near_its_region() {
        let plain = Disk::new(5.0, 1.0, 2.0).generate().unwrap();
        let refined = Disk::new(5.0, 1.0, 2.0)
            .with_refinement(Refinement::circle(Point2::new(1.0, 0.0), 1.0, 0.1))
            .generate()
            .unwrap();
        assert!(refined.coordinates.len() > plain.coordinates.len());
    }

    #[test]
    fn unrefined_bottom_differs_from_mirrored_bottom() {
        let refinement = Refinement::circle(Point2::new(1.0, 0.0), 1.0, 0.1);
        let mirrored = Disk::new(5.0, 1.0, 2.0)
            .with_refinement(refinement.clone())
            .generate()
            .unwrap();
        let one_sided = Disk::new(5.0, 1.0, 2.0)
            .with_refinement(refinement)
            .with_bottom_refinement(false)
            .generate()
            .unwrap();
        assert!(one_sided.coordinates.len() < mirrored.coordinates.len());
    }

    #[test]
    fn too_coarse_mesh_is_rejected() {
        assert!(matches!(
            Disk::new(0.5, 0.1, 10.0).generate(),
            Err(ShapeError::Delaunay(_))
        ));
    }
}
