//! Command-line parsing for the magnetic inversion input assembler.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the parsing/resolution code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::FieldOrder;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "magdriver",
    version,
    about = "Assemble magnetic inversion inputs from a driver file"
)]
pub struct Cli {
    /// Log filter (e.g. `debug`, `magdriver=trace`); overrides RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a driver file and print its fields. No other file is read.
    Check(CheckArgs),
    /// Resolve every derived property, print a summary and optionally export.
    Assemble(AssembleArgs),
    /// Parse an observation file and print a summary.
    Obs(ObsArgs),
}

#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Driver file (13-line inversion input).
    #[arg(value_name = "DRIVER")]
    pub driver: PathBuf,
}

#[derive(Debug, Parser)]
pub struct AssembleArgs {
    /// Driver file (13-line inversion input).
    #[arg(value_name = "DRIVER")]
    pub driver: PathBuf,

    /// Column order of the ambient field on the first observation line.
    #[arg(long, value_enum, default_value_t = FieldOrder::Ubc)]
    pub field_order: FieldOrder,

    /// Export the assembled inputs to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export one CSV row per active cell.
    #[arg(long = "export-cells", value_name = "CSV")]
    pub export_cells: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct ObsArgs {
    /// Observation file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Column order of the ambient field on the first line.
    #[arg(long, value_enum, default_value_t = FieldOrder::Ubc)]
    pub field_order: FieldOrder,

    /// Write the survey back out with all five columns.
    #[arg(long, value_name = "PATH")]
    pub rewrite: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_flags_parse() {
        let cli = Cli::parse_from([
            "magdriver",
            "assemble",
            "run/inv.inp",
            "--field-order",
            "intensity",
            "--export-json",
            "out.json",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Assemble(args) => {
                assert_eq!(args.driver, PathBuf::from("run/inv.inp"));
                assert_eq!(args.field_order, FieldOrder::Intensity);
                assert_eq!(args.export_json, Some(PathBuf::from("out.json")));
                assert!(args.export_cells.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn field_order_defaults_to_ubc() {
        let cli = Cli::parse_from(["magdriver", "obs", "data.obs"]);
        match cli.command {
            Command::Obs(args) => assert_eq!(args.field_order, FieldOrder::Ubc),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
