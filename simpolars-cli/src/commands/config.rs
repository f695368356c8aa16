//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path` commands
//! for viewing and modifying settings from the command line.

use std::path::Path;

use clap::Subcommand;
use simpolars::config::{config_file_path, SettingsKey};

use super::common::load_config;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a setting
    Get {
        /// Setting name, optionally with its section (e.g. graph.airspeed_min_kph)
        key: String,
    },

    /// Set a setting
    Set {
        /// Setting name, optionally with its section (e.g. capture.precision)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key, config_path),
        ConfigCommands::Set { key, value } => run_set(&key, &value, config_path),
        ConfigCommands::List => run_list(config_path),
        ConfigCommands::Path => run_path(config_path),
    }
}

fn parse_key(key: &str) -> Result<SettingsKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown setting '{}'. Use 'simpolars config list' to see available keys.",
            key
        ))
    })
}

fn run_get(key: &str, config_path: Option<&Path>) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let config = load_config(config_path)?;
    println!("{}", key.get(&config.settings));
    Ok(())
}

fn run_set(key: &str, value: &str, config_path: Option<&Path>) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let mut config = load_config(config_path)?;

    config
        .settings
        .set(key.name(), value)
        .map_err(|e| CliError::Config(e.to_string()))?;

    match config_path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }

    println!("Set {} = {}", key, key.get(&config.settings));
    Ok(())
}

fn run_list(config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;

    println!("Settings");
    println!("========");
    println!();

    let mut current_section = "";
    for key in SettingsKey::all() {
        let section = key.section();
        if section != current_section {
            if !current_section.is_empty() {
                println!();
            }
            println!("[{}]", section);
            current_section = section;
        }
        println!(
            "  {} = {}  ({})",
            key.name(),
            key.get(&config.settings),
            key.value_type()
        );
    }

    println!();
    println!("[logging]");
    println!("  level = {}", config.logging.level);
    match &config.logging.file {
        Some(file) => println!("  file = {}", file.display()),
        None => println!("  file = (not set)"),
    }

    Ok(())
}

fn run_path(config_path: Option<&Path>) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    println!("{}", path.display());
    Ok(())
}
