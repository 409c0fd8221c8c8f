//! CLI error types.

use std::{io, path::PathBuf};

use protolite_codegen::GenerateError;
use protolite_wire::DecodeError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced to the user by the `protolite` binary.
#[derive(Error, Debug)]
pub enum CliError {
    /// Input file could not be read
    #[error("failed to read {}", path.display())]
    Read {
        /// Input path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Output file could not be written
    #[error("failed to write {}", path.display())]
    Write {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Writing to stdout failed
    #[error("failed to write output")]
    Output(#[from] io::Error),

    /// Input is not a valid descriptor set
    #[error("{} is not a valid descriptor set", path.display())]
    Descriptor {
        /// Input path
        path: PathBuf,
        /// Decode failure
        #[source]
        source: DecodeError,
    },

    /// Input is not a decodable message
    #[error("{} is not a valid message", path.display())]
    Inspect {
        /// Input path
        path: PathBuf,
        /// Decode failure
        #[source]
        source: DecodeError,
    },

    /// Generation rejected the schema
    #[error("code generation failed")]
    Generate(#[from] GenerateError),
}
