/*!
stokesmesh
==========

**stokesmesh** compiles declarative descriptions of rigid and flexible bodies
immersed in a viscous fluid (spheres, ellipsoids, planes, disks, flagella)
into a single flat triangulated surface mesh, ready to be consumed by an
external boundary-element Stokes solver. It tracks per-node velocities,
enforces a consistent surface orientation, and keeps a named index of which
nodes and triangles belong to which body across arbitrary nested compositions
of moving sub-systems.
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::manual_range_contains)]

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;
#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;

pub mod kinematics;
pub mod math;
pub mod mesh;
pub mod shape;
pub mod solver;
pub mod system;
pub mod transformation;
pub mod utils;
