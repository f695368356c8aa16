//! Logging setup.
//!
//! Builds a `tracing-subscriber` registry with an env-filter, a stderr layer
//! with local timestamps and, when configured, a non-blocking file layer.
//! `RUST_LOG` overrides the configured level.

use std::path::PathBuf;

use time::format_description::well_known::Rfc3339;
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Result, SimPolarsError};

/// Default filter level for the simpolars crates.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Logging options.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Level for the simpolars crates (`error`..`trace`).
    pub level: String,
    /// Optional log file; written in addition to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Filter directives derived from the configured level.
    pub fn filter_directives(&self) -> String {
        format!("simpolars={level},simpolars_cli={level}", level = self.level)
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for as long as logging is needed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter_directives()))
        .map_err(|e| SimPolarsError::LoggingInit(e.to_string()))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::new(Rfc3339))
        .with_target(false);

    let (file_layer, guard) = match config.file {
        Some(ref path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "simpolars.log".into());

            std::fs::create_dir_all(&directory)?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::new(Rfc3339));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SimPolarsError::LoggingInit(e.to_string()))?;

    Ok(guard)
}
