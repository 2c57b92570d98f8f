//! The fixed file formats of the external boundary-element solver: the mesh
//! input file, the numeric configuration file, the per-element output file,
//! and the name → index-range table that carries object identity across the
//! solver's flat, name-less arrays.

pub use self::config::SolverConfig;
pub use self::input::{read_input_dat, read_input_slice, write_input_dat, InputMesh};
pub use self::output::{read_output_dat, slice_records, OutputRecord};
pub use self::ranges::Ranges;

mod config;
mod input;
mod output;
mod ranges;

/// Errors raised while reading or writing solver files.
#[derive(thiserror::Error, Debug)]
pub enum SolverError {
    /// An underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A file did not match the expected fixed format.
    #[error("malformed {file} at line {line}: {message}")]
    Parse {
        /// Which file kind was being read.
        file: &'static str,
        /// 1-based line number of the offending line.
        line: usize,
        /// What went wrong.
        message: String,
    },
    /// A name was looked up that the range table does not contain.
    #[error("unknown object name `{0}` in the range table")]
    UnknownObject(String),
}
