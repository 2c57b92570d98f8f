//! The solver's per-element output file (`output.dat`): one record per
//! element carrying its velocity, the solved force density, and the element
//! position. Consumed by slicing with the [`Ranges`](super::Ranges) table.

use super::SolverError;
use crate::math::{Point, Real, Vector};
use crate::mesh::IndexRange;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One element record of the solver output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputRecord {
    /// 0-based element index (the file is 1-based).
    pub element: usize,
    /// Element velocity.
    pub velocity: Vector<Real>,
    /// Solved traction (force density) on the element.
    pub force_density: Vector<Real>,
    /// Element position.
    pub position: Point<Real>,
}

/// Reads every element record of a solver output file. Lines that do not
/// parse as a 10-column record (headers, footers, blank lines) are skipped.
pub fn read_output_dat(path: &Path) -> Result<Vec<OutputRecord>, SolverError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 10 {
            continue;
        }

        let Ok(index) = tokens[0].parse::<usize>() else {
            continue;
        };
        let values: Option<Vec<Real>> = tokens[1..]
            .iter()
            .map(|token| token.parse::<Real>().ok())
            .collect();
        let Some(v) = values else { continue };

        records.push(OutputRecord {
            element: index - 1,
            velocity: Vector::new(v[0], v[1], v[2]),
            force_density: Vector::new(v[3], v[4], v[5]),
            position: Point::new(v[6], v[7], v[8]),
        });
    }

    Ok(records)
}

/// The records of one named object, selected by its triangle range.
pub fn slice_records(records: &[OutputRecord], tria_range: &IndexRange) -> Vec<OutputRecord> {
    records
        .iter()
        .filter(|record| tria_range.contains(record.element))
        .copied()
        .collect()
}
