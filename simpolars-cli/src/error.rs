//! CLI error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration problem (unknown key, bad value, unreadable file).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required input file is missing.
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// Error from the simpolars library.
    #[error(transparent)]
    Library(#[from] simpolars::SimPolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ctrl-C handler could not be installed.
    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
