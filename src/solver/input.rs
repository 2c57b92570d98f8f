//! The solver's mesh input file (`input.dat`): a header, the node block, and
//! the element block with per-element boundary conditions.
//!
//! Indices are 1-based inside the file and 0-based everywhere in this crate.
//! Floats are written in shortest round-trip notation, so writing and
//! re-reading a mesh reproduces it exactly.

use super::SolverError;
use crate::math::{Point, Real, Vector};
use crate::mesh::{IndexRange, Triangulation};
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Marker line opening the node block.
const NODES_MARKER: &str = "$ Nodes";
/// Marker line opening the element block. Readers match on this prefix only,
/// like the solver's own tooling.
const ELEMENTS_MARKER: &str = "$ Elements and Boundary Co";

/// Writes the fused mesh as a solver input file.
///
/// Every element gets the boundary-condition type "velocity prescribed" on
/// all three axes; the prescribed value is the mean of the velocities of the
/// element's three vertices.
pub fn write_input_dat(
    path: &Path,
    triangulation: &Triangulation,
    viscosity: Real,
    description: &str,
) -> Result<(), SolverError> {
    let mut out = BufWriter::new(File::create(path)?);

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    if description.is_empty() {
        writeln!(out, "generated at unix time {stamp}")?;
    } else {
        writeln!(out, "{description},\tgenerated at unix time {stamp}")?;
    }

    writeln!(out, "\t1       ! Problem Type (Do not change this number)")?;
    writeln!(
        out,
        "\t{}\t{}\t{}\t ! No. of Elements, Nodes, Mu (Viscosity)",
        triangulation.element_count(),
        triangulation.node_count(),
        viscosity
    )?;

    writeln!(out, " $ Nodes (Node #, x, y, and z coordinates):")?;
    for (i, pt) in triangulation.coordinates.iter().enumerate() {
        writeln!(out, "{}\t{}\t{}\t{}", i + 1, pt.x, pt.y, pt.z)?;
    }

    writeln!(
        out,
        " $ Elements and Boundary Conditions (Elem #, Connectivity, BC Type (1=velocity given/2=traction given, in x,y,z) and given BC Values (in x,y,z)):"
    )?;
    for (i, tri) in triangulation.triangles.iter().enumerate() {
        let [a, b, c] = tri.map(|idx| idx as usize);
        let velocity =
            (triangulation.velocities[a] + triangulation.velocities[b] + triangulation.velocities[c])
                / 3.0;
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t1\t1\t1\t{}\t{}\t{}",
            i + 1,
            a + 1,
            b + 1,
            c + 1,
            velocity.x,
            velocity.y,
            velocity.z
        )?;
    }

    out.flush()?;
    info!(
        "wrote solver input {:?}: {} nodes, {} elements",
        path,
        triangulation.node_count(),
        triangulation.element_count()
    );
    Ok(())
}

/// A mesh read back from a solver input file.
#[derive(Clone, Debug, Default)]
pub struct InputMesh {
    /// The node positions.
    pub coordinates: Vec<Point<Real>>,
    /// Triangles, 0-based.
    pub triangles: Vec<[u32; 3]>,
    /// The prescribed velocity of each element.
    pub element_velocities: Vec<Vector<Real>>,
    /// The fluid viscosity from the counts line.
    pub viscosity: Real,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Nodes,
    Elements,
}

/// Reads a whole solver input file back.
pub fn read_input_dat(path: &Path) -> Result<InputMesh, SolverError> {
    let reader = BufReader::new(File::open(path)?);
    let mut mesh = InputMesh::default();
    let mut section = Section::Header;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;

        if line.contains(NODES_MARKER) {
            section = Section::Nodes;
            continue;
        }
        if line.contains(ELEMENTS_MARKER) {
            section = Section::Elements;
            continue;
        }

        match section {
            Section::Header => {
                // The third line carries the counts and the viscosity.
                if idx == 2 {
                    let tokens: Vec<&str> = line.split_whitespace().collect();
                    mesh.viscosity = tokens
                        .get(2)
                        .and_then(|token| token.parse::<Real>().ok())
                        .ok_or_else(|| SolverError::Parse {
                            file: "input.dat",
                            line: idx + 1,
                            message: "expected `elements nodes viscosity`".to_owned(),
                        })?;
                }
            }
            Section::Nodes => {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                if let [_, x, y, z] = tokens[..] {
                    match (x.parse(), y.parse(), z.parse()) {
                        (Ok(x), Ok(y), Ok(z)) => mesh.coordinates.push(Point::new(x, y, z)),
                        _ => continue,
                    }
                }
            }
            Section::Elements => {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                if tokens.len() == 10 {
                    let connectivity: Option<Vec<u32>> = tokens[1..4]
                        .iter()
                        .map(|token| token.parse::<u32>().ok().map(|idx| idx - 1))
                        .collect();
                    let velocity: Option<Vec<Real>> = tokens[7..10]
                        .iter()
                        .map(|token| token.parse::<Real>().ok())
                        .collect();
                    if let (Some(tri), Some(vel)) = (connectivity, velocity) {
                        mesh.triangles.push([tri[0], tri[1], tri[2]]);
                        mesh.element_velocities
                            .push(Vector::new(vel[0], vel[1], vel[2]));
                    }
                }
            }
        }
    }

    Ok(mesh)
}

/// Reads only the nodes and triangles of one named object out of a solver
/// input file, given its ranges; triangle connectivity is rebased onto the
/// object's own coordinate numbering.
pub fn read_input_slice(
    path: &Path,
    coord_range: &IndexRange,
    tria_range: &IndexRange,
) -> Result<(Vec<Point<Real>>, Vec<[u32; 3]>), SolverError> {
    let reader = BufReader::new(File::open(path)?);
    let mut coordinates = vec![Point::origin(); coord_range.len()];
    let mut triangles = vec![[0u32; 3]; tria_range.len()];
    let mut section = Section::Header;

    for line in reader.lines() {
        let line = line?;

        if line.contains(NODES_MARKER) {
            section = Section::Nodes;
            continue;
        }
        if line.contains(ELEMENTS_MARKER) {
            section = Section::Elements;
            continue;
        }

        match section {
            Section::Header => {}
            Section::Nodes => {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                if let [id, x, y, z] = tokens[..] {
                    if let (Ok(id), Ok(x), Ok(y), Ok(z)) =
                        (id.parse::<usize>(), x.parse(), y.parse(), z.parse())
                    {
                        if coord_range.contains(id - 1) {
                            coordinates[id - 1 - coord_range.start] = Point::new(x, y, z);
                        }
                    }
                }
            }
            Section::Elements => {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                if tokens.len() == 10 {
                    if let (Ok(id), Ok(a), Ok(b), Ok(c)) = (
                        tokens[0].parse::<usize>(),
                        tokens[1].parse::<usize>(),
                        tokens[2].parse::<usize>(),
                        tokens[3].parse::<usize>(),
                    ) {
                        if tria_range.contains(id - 1) {
                            triangles[id - 1 - tria_range.start] = [
                                (a - 1 - coord_range.start) as u32,
                                (b - 1 - coord_range.start) as u32,
                                (c - 1 - coord_range.start) as u32,
                            ];
                        }
                    }
                }
            }
        }
    }

    Ok((coordinates, triangles))
}
