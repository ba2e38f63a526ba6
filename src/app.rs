//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initializes logging
//! - decodes driver/observation files
//! - resolves the derived properties
//! - prints reports and writes optional exports

use clap::Parser;

use crate::cli::{AssembleArgs, CheckArgs, Command, ObsArgs};
use crate::driver::MagneticsDriver;
use crate::error::AppError;
use crate::io::driver::read_driver;
use crate::io::observations::{read_observations, write_observations};

pub mod pipeline;

/// Entry point for the `magdriver` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init_logging(cli.log_level.as_deref());

    match cli.command {
        Command::Check(args) => handle_check(args),
        Command::Assemble(args) => handle_assemble(args),
        Command::Obs(args) => handle_obs(args),
    }
}

fn handle_check(args: CheckArgs) -> Result<(), AppError> {
    let config = read_driver(&args.driver)?;
    println!("{}", crate::report::format_config(&config));
    Ok(())
}

fn handle_assemble(args: AssembleArgs) -> Result<(), AppError> {
    tracing::info!(driver = %args.driver.display(), "assembling inversion inputs");
    let driver = MagneticsDriver::from_file(&args.driver)?.with_field_order(args.field_order);
    let inputs = pipeline::assemble(&driver)?;

    println!("{}", crate::report::format_inputs(&inputs));

    // Optional exports.
    if let Some(path) = &args.export_json {
        crate::io::export::write_inputs_json(path, &inputs)?;
        tracing::info!(file = %path.display(), "wrote JSON export");
    }
    if let Some(path) = &args.export_cells {
        crate::io::export::write_cells_csv(path, &inputs)?;
        tracing::info!(file = %path.display(), "wrote cell CSV");
    }

    Ok(())
}

fn handle_obs(args: ObsArgs) -> Result<(), AppError> {
    let survey = read_observations(&args.file, args.field_order)?;
    println!("{}", crate::report::format_survey(&survey));

    if let Some(path) = &args.rewrite {
        write_observations(path, &survey, args.field_order)?;
        tracing::info!(file = %path.display(), "rewrote observations");
    }
    Ok(())
}
