use crate::math::{Point, Real};

/// Error raised when a triangle's winding cannot be decided.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationError {
    /// The reference point lies exactly in the plane of the given triangle,
    /// so there is no way to decide which winding points away from it.
    #[error("reference point lies in the plane of triangle {0}")]
    ReferenceInTrianglePlane(usize),
}

/// Checks whether a triangle, seen from `origin`, winds counter-clockwise
/// (i.e. its normal points away from `origin`).
///
/// Fails if `origin` is exactly coplanar with the triangle — an ambiguous
/// configuration that must never be guessed around.
pub fn triangle_points_outward(
    origin: &Point<Real>,
    pts: [&Point<Real>; 3],
    index: usize,
) -> Result<bool, OrientationError> {
    let [p1, p2, p3] = pts;
    let normal = (p1 - p2).cross(&(p3 - p2));
    let outward = p1.coords + p2.coords + p3.coords - 3.0 * origin.coords;
    let sign = outward.dot(&normal);

    if sign > 0.0 {
        Ok(true)
    } else if sign < 0.0 {
        Ok(false)
    } else {
        Err(OrientationError::ReferenceInTrianglePlane(index))
    }
}

/// Fixes the winding of every triangle so its normal points away from
/// `origin`, a point interior to the meshed shape.
///
/// Triangles with the wrong winding get their second and third vertices
/// swapped in place.
pub fn orient_triangles(
    origin: &Point<Real>,
    coords: &[Point<Real>],
    triangles: &mut [[u32; 3]],
) -> Result<(), OrientationError> {
    for (i, tri) in triangles.iter_mut().enumerate() {
        let pts = [
            &coords[tri[0] as usize],
            &coords[tri[1] as usize],
            &coords[tri[2] as usize],
        ];

        if !triangle_points_outward(origin, pts, i)? {
            tri.swap(1, 2);
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn winding_seen_from_above() {
        let origin = Point::new(0.0, 0.0, 1.0);
        let pts = [
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 0.0),
        ];
        assert_eq!(
            triangle_points_outward(&origin, [&pts[0], &pts[1], &pts[2]], 0),
            Ok(true)
        );
    }

    #[test]
    fn wrong_winding_is_swapped() {
        let origin = Point::new(0.0, 0.0, 1.0);
        let coords = vec![
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 0.0),
        ];
        let mut trias = vec![[0, 2, 1]];
        orient_triangles(&origin, &coords, &mut trias).unwrap();
        assert_eq!(trias, vec![[0, 1, 2]]);
    }

    #[test]
    fn coplanar_reference_fails() {
        let origin = Point::origin();
        let coords = vec![
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(-1.0, -1.0, 0.0),
        ];
        let mut trias = vec![[0, 1, 2]];
        assert_eq!(
            orient_triangles(&origin, &coords, &mut trias),
            Err(OrientationError::ReferenceInTrianglePlane(0))
        );
    }
}
