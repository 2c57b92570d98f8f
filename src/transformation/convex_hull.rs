use crate::math::{Point, Real, Vector};

/// Errors that can occur during convex-hull computation.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvexHullError {
    /// Fewer than four points were given.
    #[error("fewer than 4 points were given to the convex-hull algorithm")]
    IncompleteInput,
    /// The input contains invalid coordinates, or all points are (almost)
    /// collinear or coplanar.
    #[error("input points are invalid (NaN) or almost collinear/coplanar")]
    Degenerate,
}

struct Facet {
    vertices: [u32; 3],
    /// Unit outward normal.
    normal: Vector<Real>,
    alive: bool,
    outside: Vec<u32>,
    farthest: u32,
    farthest_dist: Real,
}

impl Facet {
    fn signed_distance(&self, points: &[Point<Real>], pt: &Point<Real>) -> Real {
        self.normal.dot(&(pt - points[self.vertices[0] as usize]))
    }

    fn claim(&mut self, id: u32, dist: Real) {
        self.outside.push(id);
        if dist > self.farthest_dist {
            self.farthest_dist = dist;
            self.farthest = id;
        }
    }
}

/// Builds a facet whose normal points away from `interior`.
fn make_facet(
    a: u32,
    b: u32,
    c: u32,
    points: &[Point<Real>],
    interior: &Point<Real>,
) -> Result<Facet, ConvexHullError> {
    let (pa, pb, pc) = (
        points[a as usize],
        points[b as usize],
        points[c as usize],
    );
    let mut normal = (pb - pa).cross(&(pc - pa));
    let norm = normal.norm();

    if !(norm > 0.0) {
        // Zero-area facet, or NaN coordinates.
        return Err(ConvexHullError::Degenerate);
    }

    normal /= norm;
    let mut vertices = [a, b, c];

    if normal.dot(&(interior - pa)) > 0.0 {
        vertices.swap(1, 2);
        normal = -normal;
    }

    Ok(Facet {
        vertices,
        normal,
        alive: true,
        outside: Vec::new(),
        farthest: 0,
        farthest_dist: 0.0,
    })
}

/// Picks the four extreme points spanning the initial simplex.
fn initial_simplex(points: &[Point<Real>], tol: Real) -> Result<[u32; 4], ConvexHullError> {
    let mut i0 = 0;
    let mut i1 = 0;
    let mut best_sep = -1.0;

    for axis in 0..3 {
        let mut lo = 0;
        let mut hi = 0;
        for (i, pt) in points.iter().enumerate() {
            if pt[axis] < points[lo][axis] {
                lo = i;
            }
            if pt[axis] > points[hi][axis] {
                hi = i;
            }
        }
        let sep = (points[hi] - points[lo]).norm();
        if sep > best_sep {
            best_sep = sep;
            i0 = lo;
            i1 = hi;
        }
    }

    if best_sep <= tol {
        return Err(ConvexHullError::Degenerate);
    }
    let dir = (points[i1] - points[i0]).normalize();

    let mut i2 = 0;
    let mut best = -1.0;
    for (i, pt) in points.iter().enumerate() {
        let rel = pt - points[i0];
        let off = (rel - dir * rel.dot(&dir)).norm();
        if off > best {
            best = off;
            i2 = i;
        }
    }
    if best <= tol {
        return Err(ConvexHullError::Degenerate);
    }

    let plane_normal = (points[i1] - points[i0])
        .cross(&(points[i2] - points[i0]))
        .normalize();
    let mut i3 = 0;
    let mut best = -1.0;
    for (i, pt) in points.iter().enumerate() {
        let off = plane_normal.dot(&(pt - points[i0])).abs();
        if off > best {
            best = off;
            i3 = i;
        }
    }
    if best <= tol {
        return Err(ConvexHullError::Degenerate);
    }

    Ok([i0 as u32, i1 as u32, i2 as u32, i3 as u32])
}

/// Computes the convex hull of a 3D point cloud, returning triangles that
/// index directly into the input slice.
///
/// Unlike hull routines that rebuild a vertex buffer from scratch, the
/// generators of this crate need simplices over their *own* sample arrays
/// (velocities are carried per sample), so the input numbering is preserved.
/// Input points that end up inside the hull are simply not referenced.
///
/// The triangle windings are arbitrary; callers fix them with
/// [`orient_triangles`](crate::transformation::orient_triangles).
pub fn convex_hull_indices(points: &[Point<Real>]) -> Result<Vec<[u32; 3]>, ConvexHullError> {
    if points.len() < 4 {
        return Err(ConvexHullError::IncompleteInput);
    }

    let mut scale: Real = 0.0;
    for pt in points {
        scale = scale.max(pt.coords.abs().max());
    }
    if !scale.is_finite() {
        return Err(ConvexHullError::Degenerate);
    }
    let tol = scale.max(1.0) * 1.0e-10;

    let [i0, i1, i2, i3] = initial_simplex(points, tol)?;
    let interior = Point::from(
        (points[i0 as usize].coords
            + points[i1 as usize].coords
            + points[i2 as usize].coords
            + points[i3 as usize].coords)
            / 4.0,
    );

    let mut facets = vec![
        make_facet(i0, i1, i2, points, &interior)?,
        make_facet(i0, i1, i3, points, &interior)?,
        make_facet(i0, i2, i3, points, &interior)?,
        make_facet(i1, i2, i3, points, &interior)?,
    ];

    for (i, pt) in points.iter().enumerate() {
        let id = i as u32;
        if id == i0 || id == i1 || id == i2 || id == i3 {
            continue;
        }
        for facet in facets.iter_mut() {
            let dist = facet.signed_distance(points, pt);
            if dist > tol {
                facet.claim(id, dist);
                break;
            }
        }
    }

    let mut stack: Vec<usize> = (0..facets.len())
        .filter(|&i| !facets[i].outside.is_empty())
        .collect();

    while let Some(fi) = stack.pop() {
        if !facets[fi].alive || facets[fi].outside.is_empty() {
            continue;
        }

        let eye_id = facets[fi].farthest;
        let eye = points[eye_id as usize];

        // All hull facets the eye point can see. For a convex polytope this
        // set is edge-connected, so the horizon is exactly the set of its
        // boundary edges.
        let visible: Vec<usize> = (0..facets.len())
            .filter(|&i| facets[i].alive && facets[i].signed_distance(points, &eye) > tol)
            .collect();

        let mut edges: Vec<(u32, u32)> = Vec::with_capacity(visible.len() * 3);
        let mut orphans: Vec<u32> = Vec::new();
        for &vi in &visible {
            let [a, b, c] = facets[vi].vertices;
            edges.push((a, b));
            edges.push((b, c));
            edges.push((c, a));
            facets[vi].alive = false;
            orphans.extend(facets[vi].outside.drain(..).filter(|&id| id != eye_id));
        }

        let horizon: Vec<(u32, u32)> = edges
            .iter()
            .copied()
            .filter(|&(a, b)| !edges.contains(&(b, a)))
            .collect();

        let first_new = facets.len();
        for &(a, b) in &horizon {
            facets.push(make_facet(a, b, eye_id, points, &interior)?);
        }

        for orphan in orphans {
            let pt = points[orphan as usize];
            for facet in facets[first_new..].iter_mut() {
                let dist = facet.signed_distance(points, &pt);
                if dist > tol {
                    facet.claim(orphan, dist);
                    break;
                }
            }
        }

        for i in first_new..facets.len() {
            if !facets[i].outside.is_empty() {
                stack.push(i);
            }
        }
    }

    Ok(facets
        .iter()
        .filter(|f| f.alive)
        .map(|f| f.vertices)
        .collect())
}
