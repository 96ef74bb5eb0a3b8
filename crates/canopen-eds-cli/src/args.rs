// crates/canopen-eds-cli/src/args.rs

use canopen_eds::EmitterConfig;
use clap::Parser;
use std::path::PathBuf;

/// Generate Rust object dictionary declarations from a CANopen EDS file
#[derive(Parser, Debug)]
#[command(name = "canopen-eds")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// EDS file to read
    pub input: PathBuf,

    /// Rust source file to write (its directory must exist)
    pub output: PathBuf,

    /// Node ID added to `$NODEID`-relative values such as COB-IDs
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u8).range(1..=127))]
    pub node_id: Option<u8>,

    /// JSON file with emitter settings; the options below override it
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Prefix of every generated constant
    #[arg(long)]
    pub prefix: Option<String>,

    /// Module the generated `use` line imports from
    #[arg(long)]
    pub module_path: Option<String>,

    /// Name of the generated builder function
    #[arg(long)]
    pub builder_name: Option<String>,

    /// Text placed between a Record or Array name and a member name
    #[arg(long)]
    pub member_separator: Option<String>,

    /// Print the parsed object dictionary as JSON to stdout
    #[arg(long, default_value_t = false)]
    pub dump_json: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less log output (-q warnings only, -qq errors only)
    #[arg(short = 'q', long, action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Args {
    /// Default log filter, used unless `RUST_LOG` is set.
    pub fn log_level(&self) -> &'static str {
        match (self.verbose, self.quiet) {
            (0, 0) => "info",
            (1, _) => "debug",
            (_, 0) => "trace",
            (_, 1) => "warn",
            _ => "error",
        }
    }

    /// Applies the command-line overrides on top of `base`.
    pub fn apply_overrides(&self, mut base: EmitterConfig) -> EmitterConfig {
        if let Some(prefix) = &self.prefix {
            base.prefix = prefix.clone();
        }
        if let Some(module_path) = &self.module_path {
            base.module_path = module_path.clone();
        }
        if let Some(builder_name) = &self.builder_name {
            base.builder_name = builder_name.clone();
        }
        if let Some(member_separator) = &self.member_separator {
            base.member_separator = member_separator.clone();
        }
        base
    }
}
