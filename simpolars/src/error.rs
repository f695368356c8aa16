//! Error types for SimPolars.
//!
//! Only defects are errors here: unknown settings keys, unparsable values,
//! out-of-range flap indices and I/O failures. Filtering decisions such as
//! an invalid telemetry pair or a capture outside the display range are
//! ordinary outcomes and never reach this type.

use std::path::PathBuf;

use thiserror::Error;

use crate::polar::FLAP_SLOTS;

/// Result type for SimPolars operations.
pub type Result<T> = std::result::Result<T, SimPolarsError>;

/// Errors that can occur in the SimPolars core.
#[derive(Debug, Error)]
pub enum SimPolarsError {
    /// A settings key that does not exist.
    #[error("Unknown settings key: {0}")]
    UnknownSettingsKey(String),

    /// A settings value that could not be parsed or violates an invariant.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidSettingsValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A flap index outside the supported slots.
    #[error("Flap index {0} out of range (expected 0..{max})", max = FLAP_SLOTS)]
    FlapIndexOutOfRange(usize),

    /// Configuration file could not be parsed.
    #[error("Failed to parse config {}: {reason}", .path.display())]
    ConfigParse { path: PathBuf, reason: String },

    /// A polar dataset could not be written.
    #[error("Failed to persist {}: {source}", .path.display())]
    PersistenceFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A recorded telemetry line could not be decoded.
    #[error("Invalid telemetry record on line {line}: {reason}")]
    ReplayParse { line: usize, reason: String },

    /// Logging could not be initialized.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimPolarsError {
    /// Build an [`SimPolarsError::InvalidSettingsValue`].
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSettingsValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error signals a configuration defect (rejected write).
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownSettingsKey(_)
                | Self::InvalidSettingsValue { .. }
                | Self::FlapIndexOutOfRange(_)
                | Self::ConfigParse { .. }
        )
    }
}
