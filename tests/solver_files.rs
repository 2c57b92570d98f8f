use approx::assert_relative_eq;
use std::io::Write;
use std::path::PathBuf;
use stokesmesh::kinematics::Pose;
use stokesmesh::math::Vector;
use stokesmesh::shape::Ellipsoid;
use stokesmesh::solver::{
    read_input_dat, read_input_slice, read_output_dat, slice_records, write_input_dat, Ranges,
    SolverConfig,
};
use stokesmesh::system::{Node, System};

fn temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("stokesmesh-test-{}-{name}", std::process::id()));
    path
}

fn two_body_mesh() -> stokesmesh::mesh::Triangulation {
    let spinning = System::new(
        "rotor",
        Node::leaf_with(
            Ellipsoid::sphere(1.0, 6),
            Pose::identity().with_motion(Vector::new(0.5, 0.0, 0.0), Vector::new(0.0, 0.0, 1.0)),
        ),
    );
    let still = System::new(
        "anchor",
        Node::leaf_with(
            Ellipsoid::sphere(0.5, 4),
            Pose::translated(Vector::new(4.0, 0.0, 0.0)),
        ),
    );
    spinning.join(still).triangulate().unwrap()
}

#[test]
fn input_dat_round_trip_is_exact() {
    let mesh = two_body_mesh();
    let path = temp_path("roundtrip-input.dat");
    write_input_dat(&path, &mesh, 1.0, "two bodies").unwrap();

    let read_back = read_input_dat(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    // Shortest round-trip float formatting: exact equality, not approximate.
    assert_eq!(read_back.coordinates, mesh.coordinates);
    assert_eq!(read_back.triangles, mesh.triangles);
    assert_eq!(read_back.viscosity, 1.0);

    // The prescribed element velocity is the mean of the vertex velocities.
    for (tri, vel) in mesh.triangles.iter().zip(read_back.element_velocities.iter()) {
        let expected = (mesh.velocities[tri[0] as usize]
            + mesh.velocities[tri[1] as usize]
            + mesh.velocities[tri[2] as usize])
            / 3.0;
        assert_eq!(*vel, expected);
    }
}

#[test]
fn ranged_read_recovers_each_object() {
    let mesh = two_body_mesh();
    let path = temp_path("ranged-input.dat");
    write_input_dat(&path, &mesh, 1.0, "").unwrap();

    let ranges = Ranges::from_triangulation(&mesh);
    for name in ["rotor", "anchor"] {
        let coords = ranges.coords(name).unwrap();
        let trias = ranges.trias(name).unwrap();
        let (points, triangles) = read_input_slice(&path, &coords, &trias).unwrap();

        assert_eq!(points, mesh.coordinates[coords.start..=coords.end]);
        // Connectivity comes back rebased to the object's own numbering.
        for (local, global) in triangles.iter().zip(&mesh.triangles[trias.start..=trias.end]) {
            let rebased = global.map(|idx| idx - coords.start as u32);
            assert_eq!(*local, rebased);
        }
    }

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn ranges_csv_round_trip() {
    let mesh = two_body_mesh();
    let ranges = Ranges::from_triangulation(&mesh);

    let path = temp_path("ranges.csv");
    ranges.write_csv(&path).unwrap();
    let read_back = Ranges::read_csv(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(read_back, ranges);
    assert_eq!(
        read_back.names().collect::<Vec<_>>(),
        vec!["rotor", "anchor", "all"]
    );
    assert_eq!(
        read_back.object_names().collect::<Vec<_>>(),
        vec!["rotor", "anchor"]
    );
}

#[test]
fn unknown_object_lookups_fail() {
    let ranges = Ranges::from_triangulation(&two_body_mesh());
    assert!(ranges.coords("no-such-body").is_err());
}

#[test]
fn solver_config_round_trip_and_defaults() {
    let path = temp_path("input.cnd");

    let config = SolverConfig {
        tol: 1.0e-15,
        eps: 0.14000000616,
        ..SolverConfig::default()
    };
    config.write(&path).unwrap();
    let read_back = SolverConfig::read(&path).unwrap();
    assert_eq!(read_back, config);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn solver_config_reads_fortran_notation_and_overlays_defaults() {
    let path = temp_path("fortran-input.cnd");
    {
        let mut file = std::fs::File::create(&path).unwrap();
        // A hand-written file in the solver's own style: D exponents, and
        // only the first line present.
        writeln!(file, "1.0D-8\t10\t10\t0\t1\t50\t1.0D-4\t! eps, maxl, kmp, jscal, jpre, nrmax, tol").unwrap();
    }

    let config = SolverConfig::read(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_relative_eq!(config.tol, 1.0e-4);
    assert_relative_eq!(config.eps, 1.0e-8);
    // The whole second line fell back to the defaults.
    assert_eq!(config.maxdep, 10);
    assert_eq!(config.maxcel, 12500);
    assert_relative_eq!(config.ratio, 1.005);
}

#[test]
fn output_records_slice_by_range() {
    let path = temp_path("output.dat");
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "  Some header the solver writes").unwrap();
        for i in 1..=6 {
            let x = i as f64;
            writeln!(
                file,
                "{i}\t{}\t0\t0\t{}\t0\t0\t{}\t0\t0",
                x, -x, x * 10.0
            )
            .unwrap();
        }
        writeln!(file, "  iterations: 12").unwrap();
    }

    let records = read_output_dat(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(records.len(), 6);

    let range = stokesmesh::mesh::IndexRange { start: 2, end: 4 };
    let slice = slice_records(&records, &range);
    assert_eq!(slice.len(), 3);
    assert_eq!(slice[0].element, 2);
    assert_relative_eq!(slice[0].velocity.x, 3.0);
    assert_relative_eq!(slice[0].force_density.x, -3.0);
    assert_relative_eq!(slice[0].position.x, 30.0);
}
