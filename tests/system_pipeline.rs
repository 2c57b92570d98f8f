use approx::assert_relative_eq;
use stokesmesh::kinematics::{rotation_matrix, Pose};
use stokesmesh::math::{Point, Real, Vector};
use stokesmesh::mesh::Triangulation;
use stokesmesh::shape::{Cuboid, Disk, Ellipsoid};
use stokesmesh::system::{join_systems, Node, System, SystemError};
use stokesmesh::transformation::triangle_points_outward;

fn assert_oriented_outward(mesh: &Triangulation, origin: &Point<Real>) {
    for (k, tri) in mesh.triangles.iter().enumerate() {
        let pts = [
            &mesh.coordinates[tri[0] as usize],
            &mesh.coordinates[tri[1] as usize],
            &mesh.coordinates[tri[2] as usize],
        ];
        assert!(
            triangle_points_outward(origin, pts, k).unwrap(),
            "triangle {k} points inward"
        );
    }
}

#[test]
fn end_to_end_moving_sphere() {
    // A unit sphere at the origin, grid 4, moving with v = (2, 0, 0) and
    // spinning with ω = (0, 0, 3).
    let velocity = Vector::new(2.0, 0.0, 0.0);
    let angular = Vector::new(0.0, 0.0, 3.0);
    let system = System::new(
        "sphere",
        Node::leaf_with(
            Ellipsoid::sphere(1.0, 4),
            Pose::identity().with_motion(velocity, angular),
        ),
    );

    let mesh = system.triangulate().unwrap();
    assert_eq!(mesh.node_count(), 16);
    assert_oriented_outward(&mesh, &Point::origin());

    // Every surface point obeys v = v_lin + ω × p; at p = (1, 0, 0) that
    // would be (2, 3, 0).
    for (pt, vel) in mesh.coordinates.iter().zip(mesh.velocities.iter()) {
        let expected = velocity + angular.cross(&pt.coords);
        assert_relative_eq!(*vel, expected, epsilon = 1.0e-12);
    }
}

#[test]
fn rigid_motion_equivariance() {
    // Adding a pure translation to every top-level pose translates the
    // output coordinates and leaves velocities and ranges unchanged.
    let shift = Vector::new(-3.0, 7.0, 0.5);

    let build = |extra: Vector<Real>| {
        let sphere = System::new(
            "sphere",
            Node::leaf_with(
                Ellipsoid::sphere(1.0, 6),
                Pose::translated(Vector::new(0.0, 0.0, 2.0) + extra)
                    .with_motion(Vector::new(1.0, 0.0, 0.0), Vector::new(0.0, 0.0, 1.0)),
            ),
        );
        let box_ = System::new(
            "box",
            Node::leaf_with(
                Cuboid::axis_aligned(Vector::new(2.0, 2.0, 1.0), (2, 2, 2)),
                Pose::translated(Vector::new(5.0, 0.0, 0.0) + extra),
            ),
        );
        sphere.join(box_).triangulate().unwrap()
    };

    let base = build(Vector::zeros());
    let moved = build(shift);

    assert_eq!(base.coord_ranges, moved.coord_ranges);
    assert_eq!(base.tria_ranges, moved.tria_ranges);
    assert_eq!(base.triangles, moved.triangles);
    assert_eq!(base.velocities, moved.velocities);
    for (a, b) in base.coordinates.iter().zip(moved.coordinates.iter()) {
        assert_relative_eq!(b - a, shift, epsilon = 1.0e-12);
    }
}

#[test]
fn nested_poses_compose_in_leaf_to_root_order() {
    // A sphere translated to (1, 0, 0) inside a composed system rotated by
    // 90° around z: the leaf translation is applied first, then the parent
    // rotation, so the sphere ends up centered at (0, 1, 0). The parent's
    // angular velocity acts on the already-rotated coordinates.
    let angular = Vector::new(0.0, 0.0, 2.0);
    let carrier = Node::composed(
        vec![(
            "sphere".to_owned(),
            Node::leaf_with(
                Ellipsoid::sphere(0.5, 6),
                Pose::translated(Vector::new(1.0, 0.0, 0.0)),
            ),
        )],
        Pose::identity()
            .with_rotation(rotation_matrix(std::f64::consts::FRAC_PI_2, &Vector::z()))
            .with_motion(Vector::zeros(), angular),
    )
    .unwrap();

    let mesh = System::new("carrier", carrier).triangulate().unwrap();

    let center = stokesmesh::utils::center(&mesh.coordinates);
    assert_relative_eq!(center, Point::new(0.0, 1.0, 0.0), epsilon = 1.0e-9);

    for (pt, vel) in mesh.coordinates.iter().zip(mesh.velocities.iter()) {
        assert_relative_eq!(*vel, angular.cross(&pt.coords), epsilon = 1.0e-12);
    }

    // The composed name spans its single child.
    assert_eq!(mesh.coord_ranges["carrier"], mesh.coord_ranges["sphere"]);
}

#[test]
fn named_ranges_partition_the_fused_mesh() {
    let system = join_systems([
        System::new("sphere", Node::leaf(Ellipsoid::sphere(1.0, 6))),
        System::new(
            "floor",
            Node::leaf_with(
                Disk::new(4.0, 0.5, 0.3),
                Pose::translated(Vector::new(0.0, 0.0, -3.0)),
            ),
        ),
        System::new(
            "box",
            Node::leaf(Cuboid::axis_aligned(Vector::new(1.0, 1.0, 1.0), (2, 2, 2))),
        ),
    ]);

    let mesh = system.triangulate().unwrap();
    let leaves = ["sphere", "floor", "box"];

    // Leaf ranges are contiguous, in insertion order, with no gaps or
    // overlaps, and cover [0, N-1] and [0, M-1].
    let mut next_coord = 0;
    let mut next_tria = 0;
    for name in leaves {
        let coords = mesh.coord_ranges[name];
        let trias = mesh.tria_ranges[name];
        assert_eq!(coords.start, next_coord, "gap before `{name}` nodes");
        assert_eq!(trias.start, next_tria, "gap before `{name}` triangles");
        next_coord = coords.end + 1;
        next_tria = trias.end + 1;
    }
    assert_eq!(next_coord, mesh.node_count());
    assert_eq!(next_tria, mesh.element_count());

    // The aggregate root spans everything.
    assert_eq!(mesh.coord_ranges["all"].start, 0);
    assert_eq!(mesh.coord_ranges["all"].end, mesh.node_count() - 1);
    assert_eq!(mesh.tria_ranges["all"].end, mesh.element_count() - 1);

    // Triangles of each leaf only reference that leaf's nodes.
    for name in leaves {
        let coords = mesh.coord_ranges[name];
        let trias = mesh.tria_ranges[name];
        for tri in &mesh.triangles[trias.start..=trias.end] {
            assert!(tri.iter().all(|&idx| coords.contains(idx as usize)));
        }
    }
}

#[test]
fn joining_reuses_names_last_write_wins() {
    let first = System::new("body", Node::leaf(Ellipsoid::sphere(1.0, 4)));
    let second = System::new("body", Node::leaf(Ellipsoid::sphere(1.0, 6)));

    let mesh = first.join(second).triangulate().unwrap();
    // Only the 6-ring sphere survived.
    assert_eq!(mesh.node_count(), 36);
    assert_eq!(mesh.coord_ranges.len(), 2); // "body" and "all"
}

#[test]
fn empty_and_duplicate_systems_are_rejected() {
    assert!(matches!(
        System::default().triangulate(),
        Err(SystemError::Empty)
    ));

    let children = vec![
        ("a".to_owned(), Node::leaf(Ellipsoid::sphere(1.0, 4))),
        ("a".to_owned(), Node::leaf(Ellipsoid::sphere(1.0, 4))),
    ];
    assert!(matches!(
        Node::composed(children, Pose::identity()),
        Err(SystemError::DuplicateName(name)) if name == "a"
    ));

    assert!(matches!(
        Node::composed(Vec::new(), Pose::identity()),
        Err(SystemError::Empty)
    ));
}

#[test]
fn generator_failures_carry_the_object_name() {
    // A disk whose max_area leaves fewer than 5 boundary points.
    let system = System::new("floor", Node::leaf(Disk::new(0.5, 0.1, 10.0)));

    match system.triangulate() {
        Err(SystemError::Shape { name, kind, .. }) => {
            assert_eq!(name, "floor");
            assert_eq!(kind, "disk");
        }
        other => panic!("expected a shape error, got {other:?}"),
    }
}
