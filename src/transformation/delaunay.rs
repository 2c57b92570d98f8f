//! Quality triangulation of planar domains through spade's constrained
//! Delaunay refinement, plus the boundary-sampling helpers shared by the
//! disk generator and the 2D refinement regions.

use crate::math::{Point2, Real};
use crate::utils::spade::sanitize_spade_point;
use spade::{
    AngleLimit, ConstrainedDelaunayTriangulation, Point2 as SpadePoint, RefinementParameters,
    Triangulation as _,
};

/// Minimum triangle angle enforced by the quality refinement, in degrees.
const MIN_ANGLE_DEG: Real = 20.0;

/// Errors raised by the planar triangulation routines.
#[derive(thiserror::Error, Debug)]
pub enum DelaunayError {
    /// The requested maximum triangle area puts fewer than 5 points on the
    /// domain boundary, which cannot produce a usable mesh.
    #[error("only {0} points on the domain boundary; at least 5 are required (decrease the maximum triangle area)")]
    TooFewBoundaryPoints(usize),
    /// The underlying triangulation library rejected a point.
    #[error("point insertion failed: {0}")]
    Insertion(#[from] spade::InsertionError),
}

/// Coefficient relating the linear size of a well-shaped triangle to the
/// square root of its area (equilateral: side = 2·3^(-1/4)·√area).
pub(crate) fn spacing_coefficient() -> Real {
    2.0 * (3.0 as Real).powf(-0.25)
}

/// Number of evenly spaced boundary points on a circle of the given radius so
/// that the boundary spacing matches interior triangles of area `max_area`.
pub fn circle_point_count(radius: Real, max_area: Real) -> usize {
    let node_distance = spacing_coefficient() * max_area.sqrt();
    (2.0 * std::f64::consts::PI * radius / node_distance) as usize
}

/// Number of evenly spaced boundary points on an ellipse with semi-axes
/// `lengths`, using Ramanujan's perimeter approximation (exact for circles).
pub fn ellipse_boundary_point_count(lengths: (Real, Real), max_area: Real) -> usize {
    let node_distance = spacing_coefficient() * max_area.sqrt();
    let (a, b) = lengths;
    let perimeter =
        std::f64::consts::PI * (3.0 * (a + b) - ((3.0 * a + b) * (a + 3.0 * b)).sqrt());
    (perimeter / node_distance) as usize
}

/// Places `n` points evenly (in parameter angle) on an ellipse with semi-axes
/// `length1`, `length2`, rotated by `rotation_angle` and centered at `center`,
/// starting from `starting_angle`.
pub fn points_on_ellipse(
    n: usize,
    length1: Real,
    length2: Real,
    rotation_angle: Real,
    center: Point2<Real>,
    starting_angle: Real,
) -> Vec<Point2<Real>> {
    let dphi = 2.0 * std::f64::consts::PI / n as Real;
    let rotation = na::Rotation2::new(rotation_angle);
    let mut angle = starting_angle;
    let mut points = Vec::with_capacity(n);

    for _ in 0..n {
        let pt = Point2::new(length1 * angle.cos(), length2 * angle.sin());
        points.push(rotation * pt + center.coords);
        angle += dphi;
    }

    points
}

/// Triangulates the convex region spanned by `seeds` with a constrained
/// Delaunay triangulation refined to the given quality constraints.
///
/// The first `boundary` seeds must form a closed boundary ring; its edges are
/// constrained and locked so the refinement never splits them (the disk
/// generator stitches its side wall to this exact ring). The returned vertex
/// buffer starts with the seeds in their input order; Steiner vertices
/// inserted by the refinement are appended after them.
pub fn triangulate_refined(
    seeds: &[Point2<Real>],
    boundary: usize,
    max_area: Real,
) -> Result<(Vec<Point2<Real>>, Vec<[u32; 3]>), DelaunayError> {
    if boundary < 5 {
        return Err(DelaunayError::TooFewBoundaryPoints(boundary));
    }

    let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint<Real>>::new();
    let mut handles = Vec::with_capacity(seeds.len());

    for pt in seeds {
        handles.push(cdt.insert(sanitize_spade_point(SpadePoint::new(pt.x, pt.y)))?);
    }

    for ia in 0..boundary {
        let ib = (ia + 1) % boundary;
        if handles[ia] != handles[ib] {
            let _ = cdt.add_constraint(handles[ia], handles[ib]);
        }
    }

    let parameters = RefinementParameters::<Real>::new()
        .with_angle_limit(AngleLimit::from_deg(MIN_ANGLE_DEG))
        .with_max_allowed_area(max_area)
        .keep_constraint_edges();
    let _ = cdt.refine(parameters);

    // Seeds keep their input numbering; refinement vertices are appended.
    let mut coords: Vec<Point2<Real>> = seeds.to_vec();
    let mut handle_to_id = vec![None; cdt.num_vertices()];
    for (i, handle) in handles.iter().enumerate() {
        let slot = &mut handle_to_id[handle.index()];
        if slot.is_none() {
            *slot = Some(i as u32);
        }
    }

    let mut triangles = Vec::new();
    for face in cdt.inner_faces() {
        let idx = face.vertices().map(|v| {
            if let Some(id) = handle_to_id[v.fix().index()] {
                id
            } else {
                let pt = v.data();
                let id = coords.len() as u32;
                coords.push(Point2::new(pt.x, pt.y));
                handle_to_id[v.fix().index()] = Some(id);
                id
            }
        });
        triangles.push(idx);
    }

    Ok((coords, triangles))
}

/// Meshes a full circle: evenly spaced boundary ring, optional extra seed
/// points, quality refinement down to `max_area`.
pub fn triangulate_circle(
    center: Point2<Real>,
    radius: Real,
    max_area: Real,
    add_points: Option<&[Point2<Real>]>,
) -> Result<(Vec<Point2<Real>>, Vec<[u32; 3]>), DelaunayError> {
    let n = circle_point_count(radius, max_area);
    if n <= 4 {
        return Err(DelaunayError::TooFewBoundaryPoints(n));
    }

    let mut seeds = points_on_ellipse(n, radius, radius, 0.0, center, 0.0);
    if let Some(extra) = add_points {
        seeds.extend_from_slice(extra);
    }

    triangulate_refined(&seeds, n, max_area)
}

/// Meshes a full ellipse the same way as [`triangulate_circle`].
pub fn triangulate_ellipse(
    center: Point2<Real>,
    lengths: (Real, Real),
    max_area: Real,
    rotation_angle: Real,
    add_points: Option<&[Point2<Real>]>,
) -> Result<(Vec<Point2<Real>>, Vec<[u32; 3]>), DelaunayError> {
    let n = ellipse_boundary_point_count(lengths, max_area);
    if n <= 4 {
        return Err(DelaunayError::TooFewBoundaryPoints(n));
    }

    let mut seeds = points_on_ellipse(n, lengths.0, lengths.1, rotation_angle, center, 0.0);
    if let Some(extra) = add_points {
        seeds.extend_from_slice(extra);
    }

    triangulate_refined(&seeds, n, max_area)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn boundary_ring_is_preserved() {
        let radius = 1.0;
        let max_area = 0.05;
        let n = circle_point_count(radius, max_area);
        let (coords, trias) = triangulate_circle(Point2::origin(), radius, max_area, None).unwrap();

        // The first n vertices are the untouched boundary ring.
        assert!(coords.len() >= n);
        for pt in &coords[..n] {
            assert_relative_eq!(pt.coords.norm(), radius, epsilon = 1.0e-9);
        }
        assert!(!trias.is_empty());
    }

    #[test]
    fn refinement_respects_max_area() {
        let max_area = 0.02;
        let (coords, trias) = triangulate_circle(Point2::origin(), 1.0, max_area, None).unwrap();

        for tri in &trias {
            let [a, b, c] = tri.map(|i| coords[i as usize]);
            let area = 0.5 * ((b - a).x * (c - a).y - (b - a).y * (c - a).x).abs();
            assert!(area <= max_area * 1.001, "triangle area {area} exceeds {max_area}");
        }
    }

    #[test]
    fn too_coarse_boundary_is_a_configuration_error() {
        let res = triangulate_circle(Point2::origin(), 0.1, 10.0, None);
        assert!(matches!(res, Err(DelaunayError::TooFewBoundaryPoints(_))));
    }
}
