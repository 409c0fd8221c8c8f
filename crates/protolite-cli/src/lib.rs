//! Command-line front end for protolite.
//!
//! Argument parsing and command execution live here so tests can drive
//! [`run`] directly; `main.rs` only installs logging and reports errors.
//!
//! # Commands
//!
//! - `generate`: descriptor set in, Rust source out
//! - `describe`: list files, messages and fields of a descriptor set
//! - `dump`: schema-less listing of any encoded message

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod describe;
pub mod error;

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
pub use error::{CliError, Result};
use protolite_codegen::{FileDescriptorSet, GeneratorConfig};
use protolite_wire::Message;
use tracing::{debug, info};

/// Top-level arguments.
#[derive(Parser, Debug)]
#[command(name = "protolite", about = "Protocol Buffers wire tooling", version)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate Rust types from a binary FileDescriptorSet
    Generate {
        /// Descriptor set, as written by `protoc --descriptor_set_out`
        descriptor_set: PathBuf,

        /// Write source here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit decode-only types
        #[arg(long)]
        no_encode: bool,

        /// Path of the runtime crate in generated code
        #[arg(long, default_value = "protolite_wire")]
        runtime_crate: String,
    },

    /// List the files, messages and fields in a descriptor set
    Describe {
        /// Descriptor set to list
        descriptor_set: PathBuf,
    },

    /// Print the raw field structure of an encoded message
    Dump {
        /// Encoded message
        file: PathBuf,
    },
}

/// Execute `cli`, writing command output to `out`.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    match &cli.command {
        Command::Generate { descriptor_set, output, no_encode, runtime_crate } => {
            let set = load_descriptor_set(descriptor_set)?;
            let config = GeneratorConfig {
                emit_encode: !no_encode,
                runtime_crate: runtime_crate.clone(),
                ..GeneratorConfig::default()
            };
            let source = protolite_codegen::generate(&set, &config)?;

            match output {
                Some(path) => {
                    fs::write(path, &source)
                        .map_err(|source| CliError::Write { path: path.clone(), source })?;
                    info!(path = %path.display(), bytes = source.len(), "wrote generated source");
                },
                None => out.write_all(source.as_bytes())?,
            }
        },
        Command::Describe { descriptor_set } => {
            let set = load_descriptor_set(descriptor_set)?;
            describe::describe(&set, out)?;
        },
        Command::Dump { file } => {
            let bytes = read_file(file)?;
            let fields = protolite_wire::inspect(&bytes)
                .map_err(|source| CliError::Inspect { path: file.clone(), source })?;
            out.write_all(protolite_wire::render(&fields).as_bytes())?;
        },
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path).map_err(|source| CliError::Read { path: path.to_owned(), source })?;
    debug!(path = %path.display(), bytes = bytes.len(), "read input");
    Ok(bytes)
}

fn load_descriptor_set(path: &Path) -> Result<FileDescriptorSet> {
    let bytes = read_file(path)?;
    let set = FileDescriptorSet::decode(&bytes)
        .map_err(|source| CliError::Descriptor { path: path.to_owned(), source })?;
    debug!(files = set.file.len(), "decoded descriptor set");
    Ok(set)
}
