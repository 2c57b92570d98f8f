//! Small geometric utilities shared across the crate.

pub(crate) mod spade;

use crate::math::{Point, Real};

/// Computes the center of a set of points.
pub fn center(pts: &[Point<Real>]) -> Point<Real> {
    assert!(!pts.is_empty(), "cannot compute the center of zero points");
    let denom = 1.0 / (pts.len() as Real);
    let mut piter = pts.iter();
    let init = *piter.next().unwrap() * denom;
    piter.fold(init, |acc, pt| acc + pt.coords * denom)
}
