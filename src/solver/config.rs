//! The solver's numeric configuration file (`input.cnd`): two lines of
//! whitespace-separated values, iterative-solver parameters first, tree-code
//! parameters second, each line ending in a `!` comment naming the fields.
//!
//! These are the only inputs that get transparent defaulting: every field
//! omitted from a file on read keeps its default value. Fortran-style `D`
//! exponents are normalized to `E` on read.

use super::SolverError;
use crate::math::Real;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// The solver's numeric parameters, with the stock defaults.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// Small regularization value of the iterative solver.
    pub eps: Real,
    /// Maximum Krylov subspace dimension.
    pub maxl: u32,
    /// Number of vectors kept for orthogonalization.
    pub kmp: u32,
    /// Scaling flag.
    pub jscal: u32,
    /// Preconditioner flag.
    pub jpre: u32,
    /// Maximum number of restarts.
    pub nrmax: u32,
    /// Convergence tolerance of the iterative solver.
    pub tol: Real,
    /// Maximum tree depth of the fast-multipole evaluation.
    pub maxdep: u32,
    /// Minimum tree depth.
    pub mindep: u32,
    /// Maximum number of elements per leaf cell.
    pub maxepc: u32,
    /// Maximum number of tree cells.
    pub maxcel: u32,
    /// Truncation order of moments and local coefficients.
    pub nterm: u32,
    /// Number of Gauss points for integrating moments (3, 7, or 16).
    pub ngauss: u32,
    /// Cell-size ratio, greater than 1.
    pub ratio: Real,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            eps: 1.0e-8,
            maxl: 10,
            kmp: 10,
            jscal: 0,
            jpre: 1,
            nrmax: 50,
            tol: 1.0e-3,
            maxdep: 10,
            mindep: 2,
            maxepc: 100,
            maxcel: 12500,
            nterm: 12,
            ngauss: 7,
            ratio: 1.005,
        }
    }
}

/// Writes a real the way the solver expects: integral values without a
/// decimal point, everything else in exponent notation.
fn format_real(value: Real) -> String {
    if value == value.trunc() && value.abs() < 1.0e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:E}")
    }
}

/// Normalizes a Fortran-style token (`1.0D-8`) and parses it.
fn parse_real(token: &str, line: usize) -> Result<Real, SolverError> {
    token
        .replace(['D', 'd'], "E")
        .parse::<Real>()
        .map_err(|_| SolverError::Parse {
            file: "input.cnd",
            line,
            message: format!("invalid numeric token `{token}`"),
        })
}

impl SolverConfig {
    /// Writes the two-line configuration file.
    pub fn write(&self, path: &Path) -> Result<(), SolverError> {
        let mut out = BufWriter::new(File::create(path)?);

        for value in [
            format_real(self.eps),
            self.maxl.to_string(),
            self.kmp.to_string(),
            self.jscal.to_string(),
            self.jpre.to_string(),
            self.nrmax.to_string(),
            format_real(self.tol),
        ] {
            write!(out, "{value}\t")?;
        }
        writeln!(out, "! eps, maxl, kmp, jscal, jpre, nrmax, tol")?;

        for value in [
            self.maxdep.to_string(),
            self.mindep.to_string(),
            self.maxepc.to_string(),
            self.maxcel.to_string(),
            self.nterm.to_string(),
            self.ngauss.to_string(),
            format_real(self.ratio),
        ] {
            write!(out, "{value}\t")?;
        }
        write!(out, "! maxdep, mindep, maxepc, maxcel, nterm, ngauss, ratio")?;

        out.flush()?;
        Ok(())
    }

    /// Reads a configuration file, overlaying every value found onto the
    /// defaults. Values beyond the `!` comment markers are ignored; missing
    /// trailing values keep their defaults.
    pub fn read(path: &Path) -> Result<Self, SolverError> {
        let reader = BufReader::new(File::open(path)?);
        let mut lines = reader.lines();
        let mut config = SolverConfig::default();

        if let Some(line) = lines.next() {
            let values = numeric_tokens(&line?, 1)?;
            let mut values = values.into_iter();
            if let Some(v) = values.next() {
                config.eps = v;
            }
            if let Some(v) = values.next() {
                config.maxl = v as u32;
            }
            if let Some(v) = values.next() {
                config.kmp = v as u32;
            }
            if let Some(v) = values.next() {
                config.jscal = v as u32;
            }
            if let Some(v) = values.next() {
                config.jpre = v as u32;
            }
            if let Some(v) = values.next() {
                config.nrmax = v as u32;
            }
            if let Some(v) = values.next() {
                config.tol = v;
            }
        }

        if let Some(line) = lines.next() {
            let values = numeric_tokens(&line?, 2)?;
            let mut values = values.into_iter();
            if let Some(v) = values.next() {
                config.maxdep = v as u32;
            }
            if let Some(v) = values.next() {
                config.mindep = v as u32;
            }
            if let Some(v) = values.next() {
                config.maxepc = v as u32;
            }
            if let Some(v) = values.next() {
                config.maxcel = v as u32;
            }
            if let Some(v) = values.next() {
                config.nterm = v as u32;
            }
            if let Some(v) = values.next() {
                config.ngauss = v as u32;
            }
            if let Some(v) = values.next() {
                config.ratio = v;
            }
        }

        Ok(config)
    }
}

/// The numeric tokens of one line, up to the `!` comment.
fn numeric_tokens(line: &str, line_no: usize) -> Result<Vec<Real>, SolverError> {
    let mut values = Vec::new();
    for token in line.split_whitespace() {
        if token.starts_with('!') {
            break;
        }
        values.push(parse_real(token, line_no)?);
    }
    Ok(values)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn integral_reals_are_written_plain() {
        assert_eq!(format_real(10.0), "10");
        assert_eq!(format_real(1.0e-8), "1E-8");
        assert_eq!(format_real(1.005), "1.005E0");
    }

    #[test]
    fn fortran_exponents_are_normalized() {
        assert_eq!(parse_real("1.0D-8", 1).unwrap(), 1.0e-8);
        assert_eq!(parse_real("1.005d0", 1).unwrap(), 1.005);
        assert_eq!(parse_real("12500", 1).unwrap(), 12500.0);
    }
}
