//! The name → index-range table (`ranges.csv`).
//!
//! This table is the only channel by which named-object identity survives
//! into the solver's flat output arrays: post-processing re-reads it and
//! slices the per-element results with it.

use super::SolverError;
use crate::mesh::{IndexRange, Triangulation};
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

const HEADER: &str = "name,coords_start,coords_end,trias_start,trias_end";

/// For every named object: its node range and its triangle range into the
/// fused mesh, both 0-based inclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ranges {
    entries: IndexMap<String, (IndexRange, IndexRange)>,
}

impl Ranges {
    /// Extracts the range table of a fused triangulation.
    pub fn from_triangulation(triangulation: &Triangulation) -> Self {
        let mut entries = IndexMap::new();
        for (name, coord_range) in &triangulation.coord_ranges {
            if let Some(tria_range) = triangulation.tria_ranges.get(name) {
                let _ = entries.insert(name.clone(), (*coord_range, *tria_range));
            }
        }
        Ranges { entries }
    }

    /// All names, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All names except the aggregate root `all`.
    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.names().filter(|&name| name != "all")
    }

    /// The node range of the given object.
    pub fn coords(&self, name: &str) -> Result<IndexRange, SolverError> {
        self.entries
            .get(name)
            .map(|(coords, _)| *coords)
            .ok_or_else(|| SolverError::UnknownObject(name.to_owned()))
    }

    /// The triangle range of the given object.
    pub fn trias(&self, name: &str) -> Result<IndexRange, SolverError> {
        self.entries
            .get(name)
            .map(|(_, trias)| *trias)
            .ok_or_else(|| SolverError::UnknownObject(name.to_owned()))
    }

    /// Writes the table as a CSV file.
    pub fn write_csv(&self, path: &Path) -> Result<(), SolverError> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{HEADER}")?;
        for (name, (coords, trias)) in &self.entries {
            writeln!(
                out,
                "{},{},{},{},{}",
                name, coords.start, coords.end, trias.start, trias.end
            )?;
        }
        out.flush()?;
        Ok(())
    }

    /// Reads a table written by [`Ranges::write_csv`].
    pub fn read_csv(path: &Path) -> Result<Self, SolverError> {
        let reader = BufReader::new(File::open(path)?);
        let mut entries = IndexMap::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if idx == 0 {
                continue; // header
            }
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').collect();
            let parse_err = |message: &str| SolverError::Parse {
                file: "ranges.csv",
                line: idx + 1,
                message: message.to_owned(),
            };

            let [name, cs, ce, ts, te] = fields[..] else {
                return Err(parse_err("expected 5 comma-separated fields"));
            };
            let parse_index = |token: &str| {
                token
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| parse_err("invalid index"))
            };

            let coords = IndexRange {
                start: parse_index(cs)?,
                end: parse_index(ce)?,
            };
            let trias = IndexRange {
                start: parse_index(ts)?,
                end: parse_index(te)?,
            };
            let _ = entries.insert(name.to_owned(), (coords, trias));
        }

        Ok(Ranges { entries })
    }
}
