// crates/canopen-eds-cli/src/main.rs

//! Command-line front-end for `canopen-eds`.
//!
//! Reads an EDS file, writes the generated declarations and optionally dumps
//! the parsed object dictionary as JSON.

mod args;

use args::Args;
use canopen_eds::{EmitterConfig, generate};
use clap::Parser;
use log::{debug, error};
use std::error::Error;
use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level())).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let base = match &args.config {
        Some(path) => {
            debug!("Loading emitter settings from {}", path.display());
            serde_json::from_str::<EmitterConfig>(&fs::read_to_string(path)?)?
        }
        None => EmitterConfig::default(),
    };
    let config = args.apply_overrides(base);

    let od = generate(&args.input, &args.output, args.node_id, &config)?;

    if args.dump_json {
        println!("{}", serde_json::to_string_pretty(&od)?);
    }
    Ok(())
}
