//! Composition of shapes into a tree of moving sub-systems, and its
//! evaluation into one flat [`Triangulation`].
//!
//! Every node of the tree carries a [`Pose`]. Evaluation pushes poses down
//! from the root: a leaf applies its own pose first, then each ancestor pose
//! in leaf-to-root order. Poses are applied one at a time, never pre-merged
//! into a single transform, so angular velocities compose correctly across
//! nested rotations.

use crate::kinematics::Pose;
use crate::mesh::Triangulation;
use crate::shape::{ShapeError, ShapeSpec};
use log::debug;

/// Errors raised while composing or evaluating a system tree.
#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    /// A composed system without any object is undefined.
    #[error("a composed system must contain at least one object")]
    Empty,
    /// Two children of the same composed node share a name.
    #[error("duplicate object name `{0}`")]
    DuplicateName(String),
    /// A shape generator failed; the originating object is named.
    #[error("failed to mesh {kind} `{name}`")]
    Shape {
        /// Name of the failing object.
        name: String,
        /// Shape kind of the failing object.
        kind: &'static str,
        /// The generator error.
        #[source]
        source: ShapeError,
    },
}

/// One node of the composition tree: either a single shape, or a named
/// collection of sub-nodes. Both carry the rigid-body [`Pose`] of their
/// subtree.
#[derive(Clone, Debug)]
pub enum Node {
    /// A single shape.
    Leaf {
        /// The shape description.
        shape: ShapeSpec,
        /// The rigid-body state of this shape.
        pose: Pose,
    },
    /// A collection of named sub-systems moving together.
    Composed {
        /// The named children, in insertion order. Names are unique.
        children: Vec<(String, Node)>,
        /// The rigid-body state of the whole subtree.
        pose: Pose,
    },
}

impl Node {
    /// A leaf with the identity pose.
    pub fn leaf(shape: impl Into<ShapeSpec>) -> Node {
        Node::Leaf {
            shape: shape.into(),
            pose: Pose::identity(),
        }
    }

    /// A leaf with the given pose.
    pub fn leaf_with(shape: impl Into<ShapeSpec>, pose: Pose) -> Node {
        Node::Leaf {
            shape: shape.into(),
            pose,
        }
    }

    /// A composed node; the children must be non-empty and uniquely named.
    pub fn composed(children: Vec<(String, Node)>, pose: Pose) -> Result<Node, SystemError> {
        if children.is_empty() {
            return Err(SystemError::Empty);
        }
        for (i, (name, _)) in children.iter().enumerate() {
            if children[i + 1..].iter().any(|(other, _)| other == name) {
                return Err(SystemError::DuplicateName(name.clone()));
            }
        }

        Ok(Node::Composed { children, pose })
    }

    /// The pose of this node.
    pub fn pose(&self) -> &Pose {
        match self {
            Node::Leaf { pose, .. } | Node::Composed { pose, .. } => pose,
        }
    }
}

/// The user-facing, ordered name → node mapping describing a whole
/// multi-body system.
///
/// ```
/// use stokesmesh::shape::Ellipsoid;
/// use stokesmesh::system::{Node, System};
///
/// let sphere = System::new("sphere", Node::leaf(Ellipsoid::sphere(1.0, 6)));
/// let mesh = sphere.triangulate().unwrap();
/// assert_eq!(mesh.node_count(), 36);
/// assert!(mesh.coord_ranges.contains_key("sphere"));
/// assert!(mesh.coord_ranges.contains_key("all"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct System {
    entries: Vec<(String, Node)>,
}

impl System {
    /// A system holding a single named object.
    pub fn new(name: impl Into<String>, node: Node) -> System {
        System {
            entries: vec![(name.into(), node)],
        }
    }

    /// Merges another system into this one. A re-used name replaces the
    /// existing object in place (last write wins); new names are appended.
    pub fn join(mut self, other: System) -> System {
        for (name, node) in other.entries {
            match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = node,
                None => self.entries.push((name, node)),
            }
        }
        self
    }

    /// The named top-level objects, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Evaluates the whole tree — generates every shape, applies the pose
    /// chains, fuses everything — into one flat mesh whose root range is
    /// named `all`.
    pub fn triangulate(&self) -> Result<Triangulation, SystemError> {
        if self.entries.is_empty() {
            return Err(SystemError::Empty);
        }

        let root_pose = Pose::identity();
        let mut fused: Option<Triangulation> = None;
        for (name, node) in &self.entries {
            let triangulation = fuse_node(name, node, &[&root_pose])?;
            match &mut fused {
                None => fused = Some(triangulation),
                Some(acc) => acc.fuse(triangulation),
            }
        }

        let mut fused = fused.expect("at least one entry was fused");
        fused.add_id("all");
        debug!(
            "triangulated system: {} nodes, {} elements, {} named ranges",
            fused.node_count(),
            fused.element_count(),
            fused.coord_ranges.len()
        );
        Ok(fused)
    }
}

/// Joins any number of systems, in order, with [`System::join`] semantics.
pub fn join_systems(systems: impl IntoIterator<Item = System>) -> System {
    systems
        .into_iter()
        .fold(System::default(), |acc, system| acc.join(system))
}

/// Recursively evaluates one node: leaves generate their mesh and apply
/// `[own pose, ancestors...]` in order; composed nodes prepend their pose to
/// the chain, fuse their children left to right, then claim the aggregate
/// range under their own name.
fn fuse_node(
    name: &str,
    node: &Node,
    ancestors: &[&Pose],
) -> Result<Triangulation, SystemError> {
    match node {
        Node::Leaf { shape, pose } => {
            let mut mesh = shape.generate().map_err(|source| SystemError::Shape {
                name: name.to_owned(),
                kind: shape.kind(),
                source,
            })?;

            pose.apply(&mut mesh.coordinates, &mut mesh.velocities);
            for ancestor in ancestors {
                ancestor.apply(&mut mesh.coordinates, &mut mesh.velocities);
            }

            debug!(
                "meshed {} `{}`: {} nodes, {} triangles",
                shape.kind(),
                name,
                mesh.coordinates.len(),
                mesh.triangles.len()
            );
            Ok(Triangulation::from_raw(name, mesh))
        }
        Node::Composed { children, pose } => {
            let mut chain: Vec<&Pose> = Vec::with_capacity(ancestors.len() + 1);
            chain.push(pose);
            chain.extend_from_slice(ancestors);

            let mut fused: Option<Triangulation> = None;
            for (child_name, child) in children {
                let triangulation = fuse_node(child_name, child, &chain)?;
                match &mut fused {
                    None => fused = Some(triangulation),
                    Some(acc) => acc.fuse(triangulation),
                }
            }

            let mut fused = fused.ok_or(SystemError::Empty)?;
            fused.add_id(name);
            Ok(fused)
        }
    }
}
