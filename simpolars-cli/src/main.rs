//! SimPolars CLI - Command-line interface
//!
//! Replays recorded telemetry into a capture session, fits curves through
//! saved polars and manages the configuration file.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::fit::FitArgs;
use commands::replay::ReplayArgs;
use error::CliError;

/// Glide polar capture from flight simulator telemetry.
#[derive(Debug, Parser)]
#[command(name = "simpolars", version, about, long_about = None)]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// View or modify configuration settings
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Drive a capture session from a recorded telemetry stream
    Replay(ReplayArgs),

    /// Merge saved polars and print the fitted curve
    Fit(FitArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Config(command) => commands::config::run(command, config_path),
        Commands::Replay(args) => commands::replay::run(args, config_path, cli.verbose),
        Commands::Fit(args) => commands::fit::run(args, config_path, cli.verbose),
    }
}
