use crate::math::{Point, Real, Vector};
use crate::shape::RawMesh;
use indexmap::IndexMap;

/// An inclusive `(start, end)` index interval into the flat coordinate or
/// triangle arrays, identifying the entries belonging to one named object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct IndexRange {
    /// First index of the range.
    pub start: usize,
    /// Last index of the range (inclusive).
    pub end: usize,
}

impl IndexRange {
    /// The number of entries in this range.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Whether the range is empty. Inclusive ranges produced by fusion never
    /// are.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `index` falls inside this range.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }

    /// This range shifted towards higher indices by `offset`.
    pub fn shifted(self, offset: usize) -> Self {
        IndexRange {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// A flat triangulated surface mesh with per-node velocities and two named
/// range tables recording which nodes and triangles belong to which object.
///
/// Built by wrapping a single [`RawMesh`] and repeatedly [`fuse`]-ing others
/// onto it; ranges produced this way are contiguous, non-overlapping, and —
/// thanks to the insertion-ordered tables — deterministic.
///
/// [`fuse`]: Triangulation::fuse
#[derive(Clone, Debug, Default)]
pub struct Triangulation {
    /// The mesh node positions.
    pub coordinates: Vec<Point<Real>>,
    /// The velocity of each node.
    pub velocities: Vec<Vector<Real>>,
    /// Triangles as triples of indices into `coordinates`, zero-based.
    pub triangles: Vec<[u32; 3]>,
    /// For each object name, the range of its nodes.
    pub coord_ranges: IndexMap<String, IndexRange>,
    /// For each object name, the range of its triangles.
    pub tria_ranges: IndexMap<String, IndexRange>,
}

impl Triangulation {
    /// Wraps a single generated mesh under the given object name.
    pub fn from_raw(name: &str, mesh: RawMesh) -> Self {
        debug_assert!(mesh.is_consistent());
        let mut coord_ranges = IndexMap::new();
        let mut tria_ranges = IndexMap::new();
        let _ = coord_ranges.insert(
            name.to_owned(),
            IndexRange {
                start: 0,
                end: mesh.coordinates.len() - 1,
            },
        );
        let _ = tria_ranges.insert(
            name.to_owned(),
            IndexRange {
                start: 0,
                end: mesh.triangles.len() - 1,
            },
        );

        Triangulation {
            coordinates: mesh.coordinates,
            velocities: mesh.velocities,
            triangles: mesh.triangles,
            coord_ranges,
            tria_ranges,
        }
    }

    /// The number of nodes of the fused mesh.
    pub fn node_count(&self) -> usize {
        self.coordinates.len()
    }

    /// The number of triangles of the fused mesh.
    pub fn element_count(&self) -> usize {
        self.triangles.len()
    }

    /// Appends another triangulation to this one, in place.
    ///
    /// The other mesh's arrays are concatenated after this one's; its
    /// triangle connectivity and all of its named ranges are shifted by the
    /// pre-fusion sizes. Assumes both operands' ranges are contiguous and
    /// start at zero, which holds for every triangulation produced by
    /// [`Triangulation::from_raw`] and `fuse` itself.
    pub fn fuse(&mut self, other: Triangulation) {
        let coord_offset = self.coordinates.len();
        let tria_offset = self.triangles.len();

        for (name, range) in other.coord_ranges {
            let _ = self.coord_ranges.insert(name, range.shifted(coord_offset));
        }
        for (name, range) in other.tria_ranges {
            let _ = self.tria_ranges.insert(name, range.shifted(tria_offset));
        }

        self.coordinates.extend(other.coordinates);
        self.velocities.extend(other.velocities);
        self.triangles.extend(
            other
                .triangles
                .into_iter()
                .map(|tri| tri.map(|idx| idx + coord_offset as u32)),
        );
    }

    /// Adds an ambient flow field to every node velocity, e.g. a background
    /// flow the whole system is immersed in.
    pub fn add_external_flow(&mut self, flow: impl Fn(&Point<Real>) -> Vector<Real>) {
        for (velocity, pt) in self.velocities.iter_mut().zip(self.coordinates.iter()) {
            *velocity += flow(pt);
        }
    }

    /// Registers `name` as an aggregate object spanning everything fused so
    /// far.
    pub fn add_id(&mut self, name: &str) {
        let _ = self.coord_ranges.insert(
            name.to_owned(),
            IndexRange {
                start: 0,
                end: self.coordinates.len() - 1,
            },
        );
        let _ = self.tria_ranges.insert(
            name.to_owned(),
            IndexRange {
                start: 0,
                end: self.triangles.len() - 1,
            },
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{Point, Vector};

    fn raw(points: usize, trias: usize) -> RawMesh {
        RawMesh {
            coordinates: (0..points).map(|i| Point::new(i as Real, 0.0, 0.0)).collect(),
            velocities: vec![Vector::zeros(); points],
            triangles: (0..trias).map(|_| [0, 1, 2]).collect(),
        }
    }

    #[test]
    fn fusion_shifts_ranges_and_connectivity() {
        let mut fused = Triangulation::from_raw("a", raw(4, 2));
        fused.fuse(Triangulation::from_raw("b", raw(3, 1)));

        assert_eq!(fused.coord_ranges["a"], IndexRange { start: 0, end: 3 });
        assert_eq!(fused.coord_ranges["b"], IndexRange { start: 4, end: 6 });
        assert_eq!(fused.tria_ranges["a"], IndexRange { start: 0, end: 1 });
        assert_eq!(fused.tria_ranges["b"], IndexRange { start: 2, end: 2 });
        assert_eq!(fused.triangles[2], [4, 5, 6]);
    }

    #[test]
    fn fusion_is_associative() {
        let make = |n: usize| raw(n + 3, n + 1);

        let mut left = Triangulation::from_raw("a", make(1));
        left.fuse(Triangulation::from_raw("b", make(2)));
        left.fuse(Triangulation::from_raw("c", make(3)));

        let mut right_tail = Triangulation::from_raw("b", make(2));
        right_tail.fuse(Triangulation::from_raw("c", make(3)));
        let mut right = Triangulation::from_raw("a", make(1));
        right.fuse(right_tail);

        assert_eq!(left.coordinates, right.coordinates);
        assert_eq!(left.triangles, right.triangles);
        assert_eq!(left.coord_ranges, right.coord_ranges);
        assert_eq!(left.tria_ranges, right.tria_ranges);
    }

    #[test]
    fn external_flow_adds_to_velocities() {
        let mut fused = Triangulation::from_raw("a", raw(3, 1));
        fused.add_external_flow(|pt| Vector::new(0.0, pt.x, 0.0));

        assert_eq!(fused.velocities[0], Vector::new(0.0, 0.0, 0.0));
        assert_eq!(fused.velocities[2], Vector::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn aggregate_id_spans_everything() {
        let mut fused = Triangulation::from_raw("a", raw(4, 2));
        fused.fuse(Triangulation::from_raw("b", raw(3, 1)));
        fused.add_id("all");

        assert_eq!(fused.coord_ranges["all"], IndexRange { start: 0, end: 6 });
        assert_eq!(fused.tria_ranges["all"], IndexRange { start: 0, end: 2 });
    }
}
