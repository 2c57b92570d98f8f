use crate::math::{Point2, Real};
use crate::shape::ShapeError;
use crate::transformation::{
    circle_point_count, ellipse_boundary_point_count, points_on_ellipse, triangulate_circle,
    triangulate_ellipse,
};

/// A sub-area of a 2D meshing domain where the mesh density is locally
/// increased.
///
/// A refinement region is meshed on its own with its own maximum triangle
/// area; the resulting vertices are handed to the surrounding triangulation
/// as extra seed points. Regions combined with [`Refinement::Many`] must be
/// pairwise disjoint.
#[derive(Clone, Debug)]
pub enum Refinement {
    /// A circle with its own area constraint.
    Circle {
        /// Center of the circle.
        center: Point2<Real>,
        /// Radius of the circle.
        radius: Real,
        /// Maximum triangle area inside the circle.
        max_area: Real,
    },
    /// Concentric circles with progressively relaxed area constraints, the
    /// innermost meshed first and feeding its vertices outward.
    NestedCircles {
        /// Common center of the circles.
        center: Point2<Real>,
        /// `(radius, max_area)` pairs, sorted by ascending radius.
        rings: Vec<(Real, Real)>,
        /// Regions nested inside the innermost circle.
        subregions: Vec<Refinement>,
    },
    /// An ellipse with its own area constraint.
    Ellipse {
        /// Center of the ellipse.
        center: Point2<Real>,
        /// Semi-axis lengths.
        lengths: (Real, Real),
        /// Maximum triangle area inside the ellipse.
        max_area: Real,
        /// Rotation of the first axis against x, in radians.
        rotation: Real,
    },
    /// The union of several disjoint regions.
    Many(Vec<Refinement>),
}

impl Refinement {
    /// A circular refinement region.
    pub fn circle(center: Point2<Real>, radius: Real, max_area: Real) -> Self {
        Refinement::Circle {
            center,
            radius,
            max_area,
        }
    }

    /// Concentric circular regions; `rings` are `(radius, max_area)` pairs in
    /// any order.
    pub fn nested_circles(
        center: Point2<Real>,
        mut rings: Vec<(Real, Real)>,
        subregions: Vec<Refinement>,
    ) -> Self {
        rings.sort_by(|a, b| a.0.total_cmp(&b.0));
        Refinement::NestedCircles {
            center,
            rings,
            subregions,
        }
    }

    /// An elliptic refinement region.
    pub fn ellipse(center: Point2<Real>, lengths: (Real, Real), max_area: Real, rotation: Real) -> Self {
        Refinement::Ellipse {
            center,
            lengths,
            max_area,
            rotation,
        }
    }

    /// The union of several regions; they must be pairwise disjoint.
    pub fn many(regions: Vec<Refinement>) -> Self {
        Refinement::Many(regions)
    }

    /// Meshes this region and returns its vertices, to be used as seed
    /// points of the surrounding triangulation.
    pub fn produce_points(&self) -> Result<Vec<Point2<Real>>, ShapeError> {
        match self {
            Refinement::Circle {
                center,
                radius,
                max_area,
            } => Ok(triangulate_circle(*center, *radius, *max_area, None)?.0),
            Refinement::NestedCircles {
                center,
                rings,
                subregions,
            } => {
                let mut points = if subregions.is_empty() {
                    None
                } else {
                    Some(disjoint_union_points(subregions)?)
                };
                for &(radius, max_area) in rings {
                    let (coords, _) =
                        triangulate_circle(*center, radius, max_area, points.as_deref())?;
                    points = Some(coords);
                }
                Ok(points.unwrap_or_default())
            }
            Refinement::Ellipse {
                center,
                lengths,
                max_area,
                rotation,
            } => Ok(triangulate_ellipse(*center, *lengths, *max_area, *rotation, None)?.0),
            Refinement::Many(regions) => disjoint_union_points(regions),
        }
    }

    /// Points sampled on the outer boundary of this region, used for
    /// distance computations.
    fn boundary_points(&self) -> Vec<Point2<Real>> {
        match self {
            Refinement::Circle {
                center,
                radius,
                max_area,
            } => {
                let n = circle_point_count(*radius, *max_area).max(8);
                points_on_ellipse(n, *radius, *radius, 0.0, *center, 0.0)
            }
            Refinement::NestedCircles { center, rings, .. } => match rings.last() {
                Some(&(radius, max_area)) => {
                    let n = circle_point_count(radius, max_area).max(8);
                    points_on_ellipse(n, radius, radius, 0.0, *center, 0.0)
                }
                None => Vec::new(),
            },
            Refinement::Ellipse {
                center,
                lengths,
                max_area,
                rotation,
            } => {
                let n = ellipse_boundary_point_count(*lengths, *max_area).max(8);
                points_on_ellipse(n, lengths.0, lengths.1, *rotation, *center, 0.0)
            }
            Refinement::Many(regions) => regions
                .iter()
                .flat_map(|region| region.boundary_points())
                .collect(),
        }
    }

    /// Distance from a point to this region; zero when the point is inside.
    pub fn distance_to_point(&self, point: &Point2<Real>) -> Real {
        match self {
            Refinement::Circle { center, radius, .. } => ((center - point).norm() - radius).max(0.0),
            Refinement::NestedCircles { center, rings, .. } => {
                let outer = rings.last().map(|&(radius, _)| radius).unwrap_or(0.0);
                ((center - point).norm() - outer).max(0.0)
            }
            Refinement::Ellipse { .. } => self
                .boundary_points()
                .iter()
                .map(|bp| (bp - point).norm())
                .fold(Real::INFINITY, Real::min),
            Refinement::Many(regions) => regions
                .iter()
                .map(|region| region.distance_to_point(point))
                .fold(Real::INFINITY, Real::min),
        }
    }

    /// Distance between the boundaries of two regions; zero when they touch
    /// or overlap.
    pub fn distance_to_region(&self, other: &Refinement) -> Real {
        match self {
            Refinement::Circle { center, radius, .. } => {
                (other.distance_to_point(center) - radius).max(0.0)
            }
            Refinement::NestedCircles { center, rings, .. } => {
                let outer = rings.last().map(|&(radius, _)| radius).unwrap_or(0.0);
                (other.distance_to_point(center) - outer).max(0.0)
            }
            Refinement::Ellipse { .. } => self
                .boundary_points()
                .iter()
                .map(|bp| other.distance_to_point(bp))
                .fold(Real::INFINITY, Real::min),
            Refinement::Many(regions) => regions
                .iter()
                .map(|region| region.distance_to_region(other))
                .fold(Real::INFINITY, Real::min),
        }
    }
}

/// Meshes a list of pairwise-disjoint regions and concatenates their seed
/// points. Fails fast when any two regions touch, before meshing anything.
fn disjoint_union_points(regions: &[Refinement]) -> Result<Vec<Point2<Real>>, ShapeError> {
    for (i, first) in regions.iter().enumerate() {
        for second in &regions[i + 1..] {
            if first.distance_to_region(second) <= 0.0 {
                return Err(ShapeError::RefinementCollision);
            }
        }
    }

    let mut points = Vec::new();
    for region in regions {
        points.extend(region.produce_points()?);
    }
    Ok(points)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn disjoint_circles_produce_points() {
        let region = Refinement::many(vec![
            Refinement::circle(Point2::new(0.0, 0.0), 1.0, 0.1),
            Refinement::circle(Point2::new(5.0, 0.0), 1.0, 0.1),
        ]);
        let points = region.produce_points().unwrap();
        assert!(!points.is_empty());
    }

    #[test]
    fn colliding_regions_fail_fast() {
        let region = Refinement::many(vec![
            Refinement::circle(Point2::new(0.0, 0.0), 1.0, 0.1),
            Refinement::circle(Point2::new(1.5, 0.0), 1.0, 0.1),
        ]);
        assert!(matches!(
            region.produce_points(),
            Err(ShapeError::RefinementCollision)
        ));
    }

    #[test]
    fn nested_circles_accumulate_inner_points() {
        let region = Refinement::nested_circles(
            Point2::origin(),
            vec![(5.0, 2.0), (2.0, 0.5)],
            Vec::new(),
        );
        let points = region.produce_points().unwrap();

        // The inner, finer circle leaves a denser cluster near the center.
        let inner = points.iter().filter(|p| p.coords.norm() <= 2.0).count();
        let outer = points.iter().filter(|p| p.coords.norm() > 2.0).count();
        assert!(inner > 0 && outer > 0);
        assert!(inner as f64 / (2.0 * 2.0) > outer as f64 / (5.0 * 5.0 - 2.0 * 2.0));
    }

    #[test]
    fn distance_between_circles() {
        let a = Refinement::circle(Point2::new(0.0, 0.0), 1.0, 0.1);
        let b = Refinement::circle(Point2::new(4.0, 0.0), 1.0, 0.1);
        assert_relative_eq!(a.distance_to_region(&b), 2.0, epsilon = 1.0e-12);
    }
}
