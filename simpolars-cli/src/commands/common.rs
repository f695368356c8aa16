//! Common types and utilities shared across CLI commands.

use std::path::Path;

use simpolars::config::{config_file_path, ConfigFile};
use simpolars::logging::{init_logging, WorkerGuard};

use crate::error::CliError;

/// Load the config from `path`, or the default location.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    ConfigFile::load_from(&path).map_err(|e| CliError::Config(e.to_string()))
}

/// Loaded configuration plus the logging guard for a command run.
pub struct CliRunner {
    config: ConfigFile,
    _log_guard: Option<WorkerGuard>,
}

impl CliRunner {
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        let config = load_config(config_path)?;
        let mut logging = config.logging.clone();
        if verbose {
            logging.level = "debug".to_string();
        }
        let guard = init_logging(&logging)?;
        Ok(Self {
            config,
            _log_guard: guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        tracing::info!(
            version = simpolars::VERSION,
            command,
            "SimPolars starting"
        );
    }
}
