//! Tube meshes around a parametric centerline: the four flagellum variants,
//! differing in how the surface velocity is obtained.

use crate::kinematics::rotate_vector;
use crate::math::{Point, Real, Vector};
use crate::shape::{RawMesh, ShapeError};
use std::f64::consts::PI;

/// A flagellum described by two snapshots of its centerline `dt` apart.
///
/// Rings are placed halfway between successive centerline points; the
/// material frame starts from a deterministic normal of the first tangent
/// and is parallel-transported along the tube. Surface velocities are the
/// finite difference of the two centerline configurations.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Flagellum {
    /// Tube radius.
    pub radius: Real,
    /// Centerline points at the current time.
    pub points: Vec<Point<Real>>,
    /// Centerline points a time `dt` later.
    pub points_next: Vec<Point<Real>>,
    /// Number of azimuthal points per ring.
    pub n_theta: u32,
    /// Time step separating the two configurations.
    pub dt: Real,
}

/// A flagellum with explicit material frames at every centerline point, the
/// velocity finite-differenced per surface node between two configurations.
///
/// Rings are placed around the interior centerline points only; the two tips
/// are capped with single points.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Flagellum2 {
    /// Tube radius.
    pub radius: Real,
    /// Centerline points at the current time.
    pub points: Vec<Point<Real>>,
    /// Tangent at every centerline point.
    pub tangents: Vec<Vector<Real>>,
    /// Reference normal at every centerline point; each ring starts in the
    /// direction of its normal, which keeps meshes of different shapes
    /// comparable.
    pub normals: Vec<Vector<Real>>,
    /// Centerline points a time `dt` later.
    pub points_next: Vec<Point<Real>>,
    /// Tangents a time `dt` later.
    pub tangents_next: Vec<Vector<Real>>,
    /// Normals a time `dt` later.
    pub normals_next: Vec<Vector<Real>>,
    /// Time step separating the two configurations.
    pub dt: Real,
    /// Number of azimuthal points per ring.
    pub n_theta: u32,
}

/// A flagellum with explicit material frames and explicit per-centerline-
/// point velocities, copied to every node of the corresponding ring.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FlagellumVel {
    /// Tube radius.
    pub radius: Real,
    /// Centerline points.
    pub points: Vec<Point<Real>>,
    /// Velocity of every centerline point.
    pub velocities: Vec<Vector<Real>>,
    /// Tangent at every centerline point.
    pub tangents: Vec<Vector<Real>>,
    /// Reference normal at every centerline point.
    pub normals: Vec<Vector<Real>>,
    /// Number of azimuthal points per ring.
    pub n_theta: u32,
}

/// Like [`FlagellumVel`], plus the analytic velocity contribution of the
/// rotating material frame, derived from the rate of change of the normals.
///
/// The correction `v += r·(n̂·r̂)·dn/dt` is only valid for planar beat
/// patterns.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FlagellumVelNorm {
    /// Tube radius.
    pub radius: Real,
    /// Centerline points.
    pub points: Vec<Point<Real>>,
    /// Velocity of every centerline point.
    pub velocities: Vec<Vector<Real>>,
    /// Tangent at every centerline point.
    pub tangents: Vec<Vector<Real>>,
    /// Reference normal at every centerline point.
    pub normals: Vec<Vector<Real>>,
    /// Rate of change of the normal at every centerline point.
    pub normal_velocities: Vec<Vector<Real>>,
    /// Number of azimuthal points per ring.
    pub n_theta: u32,
}

impl Flagellum {
    /// A flagellum from two centerline snapshots.
    pub fn new(
        radius: Real,
        points: Vec<Point<Real>>,
        points_next: Vec<Point<Real>>,
        n_theta: u32,
        dt: Real,
    ) -> Self {
        Flagellum {
            radius,
            points,
            points_next,
            n_theta,
            dt,
        }
    }

    /// Generates the capped tube mesh.
    pub fn generate(&self) -> Result<RawMesh, ShapeError> {
        check_tube(self.radius, self.n_theta)?;
        if self.points.len() < 2 {
            return Err(ShapeError::CenterlineTooShort {
                needed: 2,
                got: self.points.len(),
            });
        }
        if self.points_next.len() != self.points.len() {
            return Err(ShapeError::MismatchedCenterline("next-configuration points"));
        }
        if self.dt == 0.0 {
            return Err(ShapeError::InvalidTimeStep);
        }

        let points = &self.points;
        let rings = points.len() - 1;
        let slots = self.n_theta as usize;

        // Material frame: start from a deterministic normal of the first
        // tangent, then parallel-transport it by rotating with the tangents.
        let mut tangent = points[1] - points[0];
        let mut tangent_unit = tangent.normalize();
        let mut normal = arbitrary_normal(&tangent);

        let mut coordinates = Vec::with_capacity(rings * slots + 2);
        let mut velocities = Vec::with_capacity(rings * slots + 2);

        for i in 0..rings {
            coordinates.extend(ring_rotate_first(
                &points[i],
                &normal,
                &tangent,
                self.n_theta,
                self.radius,
            ));
            // Every node of ring i moves with the midpoint of its segment.
            let ring_velocity = 0.5 / self.dt
                * ((self.points_next[i] - points[i]) + (self.points_next[i + 1] - points[i + 1]));
            velocities.extend(std::iter::repeat(ring_velocity).take(slots));

            if i + 2 == points.len() {
                break;
            }
            let new_tangent = points[i + 2] - points[i + 1];
            let new_tangent_unit = new_tangent.normalize();
            let rot_axis = tangent_unit.cross(&new_tangent_unit);
            let angle = tangent_unit.dot(&new_tangent_unit).clamp(-1.0, 1.0).acos();
            normal = rotate_vector(&normal, angle, &rot_axis);

            tangent = new_tangent;
            tangent_unit = new_tangent_unit;
        }

        let mut triangles = tube_triangles(rings as u32, self.n_theta);

        // Tips go last; their fans close the tube.
        coordinates.push(points[0]);
        coordinates.push(points[points.len() - 1]);
        velocities.push((self.points_next[0] - points[0]) / self.dt);
        velocities.push((self.points_next[points.len() - 1] - points[points.len() - 1]) / self.dt);

        let tip_front = (rings * slots) as u32;
        for k in 0..self.n_theta - 1 {
            triangles.push([tip_front, k, k + 1]);
        }
        triangles.push([tip_front, self.n_theta - 1, 0]);

        let tip_back = tip_front + 1;
        let last_ring = ((rings - 1) * slots) as u32;
        for k in 0..self.n_theta - 1 {
            triangles.push([tip_back, last_ring + k + 1, last_ring + k]);
        }
        triangles.push([tip_back, last_ring, last_ring + self.n_theta - 1]);

        Ok(RawMesh {
            coordinates,
            velocities,
            triangles,
        })
    }
}

impl Flagellum2 {
    /// A non-moving flagellum: the next configuration equals the current one.
    pub fn stationary(
        points: Vec<Point<Real>>,
        tangents: Vec<Vector<Real>>,
        normals: Vec<Vector<Real>>,
        radius: Real,
        n_theta: u32,
    ) -> Self {
        Flagellum2 {
            radius,
            points_next: points.clone(),
            tangents_next: tangents.clone(),
            normals_next: normals.clone(),
            points,
            tangents,
            normals,
            dt: 1.0,
            n_theta,
        }
    }

    /// Sets the next configuration for the finite-difference velocities.
    pub fn with_next(
        mut self,
        points_next: Vec<Point<Real>>,
        tangents_next: Vec<Vector<Real>>,
        normals_next: Vec<Vector<Real>>,
        dt: Real,
    ) -> Self {
        self.points_next = points_next;
        self.tangents_next = tangents_next;
        self.normals_next = normals_next;
        self.dt = dt;
        self
    }

    /// Generates the capped tube mesh.
    pub fn generate(&self) -> Result<RawMesh, ShapeError> {
        check_tube(self.radius, self.n_theta)?;
        check_interior_centerline(self.points.len())?;
        for (len, what) in [
            (self.tangents.len(), "tangents"),
            (self.normals.len(), "normals"),
            (self.points_next.len(), "next-configuration points"),
            (self.tangents_next.len(), "next-configuration tangents"),
            (self.normals_next.len(), "next-configuration normals"),
        ] {
            if len != self.points.len() {
                return Err(ShapeError::MismatchedCenterline(what));
            }
        }
        if self.dt == 0.0 {
            return Err(ShapeError::InvalidTimeStep);
        }

        let last = self.points.len() - 1;
        let slots = self.n_theta as usize;
        let mut ring_coords = Vec::with_capacity((last - 1) * slots);
        let mut ring_velocities = Vec::with_capacity((last - 1) * slots);

        for i in 1..last {
            let current = ring(
                &self.points[i],
                &self.normals[i].normalize(),
                &self.tangents[i],
                self.n_theta,
                self.radius,
                0.0,
            );
            let next = ring(
                &self.points_next[i],
                &self.normals_next[i].normalize(),
                &self.tangents_next[i],
                self.n_theta,
                self.radius,
                0.0,
            );
            for (node, node_next) in current.iter().zip(next.iter()) {
                ring_coords.push(*node);
                ring_velocities.push((node_next - node) / self.dt);
            }
        }

        let tip_velocities = (
            (self.points_next[0] - self.points[0]) / self.dt,
            (self.points_next[last] - self.points[last]) / self.dt,
        );

        Ok(assemble_framed_tube(
            &self.points,
            ring_coords,
            ring_velocities,
            tip_velocities,
            self.n_theta,
        ))
    }
}

impl FlagellumVel {
    /// A flagellum with prescribed centerline velocities.
    pub fn new(
        points: Vec<Point<Real>>,
        velocities: Vec<Vector<Real>>,
        tangents: Vec<Vector<Real>>,
        normals: Vec<Vector<Real>>,
        radius: Real,
        n_theta: u32,
    ) -> Self {
        FlagellumVel {
            radius,
            points,
            velocities,
            tangents,
            normals,
            n_theta,
        }
    }

    /// Generates the capped tube mesh.
    pub fn generate(&self) -> Result<RawMesh, ShapeError> {
        check_tube(self.radius, self.n_theta)?;
        check_interior_centerline(self.points.len())?;
        for (len, what) in [
            (self.velocities.len(), "velocities"),
            (self.tangents.len(), "tangents"),
            (self.normals.len(), "normals"),
        ] {
            if len != self.points.len() {
                return Err(ShapeError::MismatchedCenterline(what));
            }
        }

        let last = self.points.len() - 1;
        let slots = self.n_theta as usize;
        let mut ring_coords = Vec::with_capacity((last - 1) * slots);
        let mut ring_velocities = Vec::with_capacity((last - 1) * slots);

        for i in 1..last {
            ring_coords.extend(ring(
                &self.points[i],
                &self.normals[i].normalize(),
                &self.tangents[i],
                self.n_theta,
                self.radius,
                0.0,
            ));
            ring_velocities.extend(std::iter::repeat(self.velocities[i]).take(slots));
        }

        Ok(assemble_framed_tube(
            &self.points,
            ring_coords,
            ring_velocities,
            (self.velocities[0], self.velocities[last]),
            self.n_theta,
        ))
    }
}

impl FlagellumVelNorm {
    /// A flagellum with prescribed centerline velocities and normal rotation
    /// rates.
    pub fn new(
        points: Vec<Point<Real>>,
        velocities: Vec<Vector<Real>>,
        tangents: Vec<Vector<Real>>,
        normals: Vec<Vector<Real>>,
        normal_velocities: Vec<Vector<Real>>,
        radius: Real,
        n_theta: u32,
    ) -> Self {
        FlagellumVelNorm {
            radius,
            points,
            velocities,
            tangents,
            normals,
            normal_velocities,
            n_theta,
        }
    }

    /// Generates the capped tube mesh.
    pub fn generate(&self) -> Result<RawMesh, ShapeError> {
        check_tube(self.radius, self.n_theta)?;
        check_interior_centerline(self.points.len())?;
        for (len, what) in [
            (self.velocities.len(), "velocities"),
            (self.tangents.len(), "tangents"),
            (self.normals.len(), "normals"),
            (self.normal_velocities.len(), "normal velocities"),
        ] {
            if len != self.points.len() {
                return Err(ShapeError::MismatchedCenterline(what));
            }
        }

        let last = self.points.len() - 1;
        let slots = self.n_theta as usize;
        let mut ring_coords = Vec::with_capacity((last - 1) * slots);
        let mut ring_velocities = Vec::with_capacity((last - 1) * slots);

        for i in 1..last {
            let normal = self.normals[i].normalize();
            let nodes = ring(
                &self.points[i],
                &normal,
                &self.tangents[i],
                self.n_theta,
                self.radius,
                0.0,
            );
            // The frame rotates with rate dn/dt; a node at azimuthal offset
            // r̂ picks up the fraction n̂·r̂ of the peak frame velocity r·dn/dt.
            for node in &nodes {
                let radial = (node - self.points[i]) / self.radius;
                let frame_velocity = self.radius * normal.dot(&radial) * self.normal_velocities[i];
                ring_coords.push(*node);
                ring_velocities.push(self.velocities[i] + frame_velocity);
            }
        }

        Ok(assemble_framed_tube(
            &self.points,
            ring_coords,
            ring_velocities,
            (self.velocities[0], self.velocities[last]),
            self.n_theta,
        ))
    }
}

fn check_tube(radius: Real, n_theta: u32) -> Result<(), ShapeError> {
    if radius <= 0.0 {
        return Err(ShapeError::NonPositive("flagellum radius"));
    }
    if n_theta < 3 {
        return Err(ShapeError::InvalidGrid("flagellum"));
    }
    Ok(())
}

fn check_interior_centerline(len: usize) -> Result<(), ShapeError> {
    if len < 3 {
        return Err(ShapeError::CenterlineTooShort { needed: 3, got: len });
    }
    Ok(())
}

/// A ring of `n_theta` points of the given radius around `center`, in the
/// plane orthogonal to `tangent`, the first point `offset_angle` past the
/// direction of `normal`.
fn ring(
    center: &Point<Real>,
    normal: &Vector<Real>,
    tangent: &Vector<Real>,
    n_theta: u32,
    radius: Real,
    offset_angle: Real,
) -> Vec<Point<Real>> {
    let mut rotated = rotate_vector(normal, offset_angle, tangent);
    let angle = 2.0 * PI / n_theta as Real;
    let mut out = Vec::with_capacity(n_theta as usize);
    for _ in 0..n_theta {
        out.push(center + rotated * radius);
        rotated = rotate_vector(&rotated, angle, tangent);
    }
    out
}

/// The legacy ring of [`Flagellum`]: the center is shifted by half the
/// (unnormalized) tangent, and the normal is rotated one azimuthal step
/// before the first point is placed.
fn ring_rotate_first(
    position: &Point<Real>,
    normal: &Vector<Real>,
    tangent: &Vector<Real>,
    n_theta: u32,
    radius: Real,
) -> Vec<Point<Real>> {
    let mut rotated = *normal;
    let angle = 2.0 * PI / n_theta as Real;
    let mut out = Vec::with_capacity(n_theta as usize);
    for _ in 0..n_theta {
        rotated = rotate_vector(&rotated, angle, tangent);
        out.push(position + 0.5 * tangent + rotated * radius);
    }
    out
}

/// A deterministic normal to the given tangent vector.
fn arbitrary_normal(tangent: &Vector<Real>) -> Vector<Real> {
    let mut normal = Vector::new(1.0, 1.0, 1.0);
    let (tx, ty, tz) = (tangent.x, tangent.y, tangent.z);

    if tx == 0.0 && ty == 0.0 {
        normal.z = 0.0;
    } else if tx == 0.0 && tz == 0.0 {
        normal.y = 0.0;
    } else if ty == 0.0 && tz == 0.0 {
        normal.x = 0.0;
    } else if tx == 0.0 {
        normal.y = -tz * normal.z / ty;
    } else if ty == 0.0 {
        normal.x = -tz * normal.z / tx;
    } else if tz == 0.0 {
        normal.x = -ty * normal.y / tx;
    } else {
        normal.x = (ty * normal.y + tz * normal.z) / (-tx);
    }

    normal.normalize()
}

/// Triangulates the (ring, slot) surface lattice of an open tube.
///
/// Triangles are generated on a grid with one redundant slot per ring (the
/// seam column), then canonicalized by remapping slot `n_theta` back to slot
/// 0 of the same ring.
fn tube_triangles(rings: u32, slots: u32) -> Vec<[u32; 3]> {
    let at = |i: u32, j: u32| i * slots + (j % slots);
    let mut out = Vec::with_capacity(2 * rings.saturating_sub(1) as usize * slots as usize);

    for i in 0..rings.saturating_sub(1) {
        for j in 0..slots {
            out.push([at(i, j), at(i + 1, j), at(i, j + 1)]);
            out.push([at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)]);
        }
    }

    out
}

/// Assembles the common layout of the framed flagellum variants: first tip
/// point, interior rings, last tip point, with fan caps at both tips.
fn assemble_framed_tube(
    points: &[Point<Real>],
    ring_coords: Vec<Point<Real>>,
    ring_velocities: Vec<Vector<Real>>,
    tip_velocities: (Vector<Real>, Vector<Real>),
    n_theta: u32,
) -> RawMesh {
    let last = points.len() - 1;
    let rings = (last - 1) as u32;
    let slots = n_theta;

    let mut coordinates = Vec::with_capacity(ring_coords.len() + 2);
    let mut velocities = Vec::with_capacity(ring_velocities.len() + 2);
    coordinates.push(points[0]);
    velocities.push(tip_velocities.0);
    coordinates.extend(ring_coords);
    velocities.extend(ring_velocities);
    coordinates.push(points[last]);
    velocities.push(tip_velocities.1);

    let mut triangles = Vec::new();

    // Front tip fan onto the first ring (nodes 1..=n_theta).
    for k in 1..slots {
        triangles.push([0, k, k + 1]);
    }
    triangles.push([0, slots, 1]);

    // Tube body, shifted by one for the front tip node.
    triangles.extend(
        tube_triangles(rings, slots)
            .into_iter()
            .map(|tri| tri.map(|idx| idx + 1)),
    );

    // Back tip fan onto the last ring, wound the other way.
    let tip_back = rings * slots + 1;
    let last_ring = 1 + (rings - 1) * slots;
    for k in 0..slots - 1 {
        triangles.push([tip_back, last_ring + k + 1, last_ring + k]);
    }
    triangles.push([tip_back, last_ring, last_ring + slots - 1]);

    RawMesh {
        coordinates,
        velocities,
        triangles,
    }
}
