//! INI configuration file.

use std::path::{Path, PathBuf};

use ini::Ini;

use super::key::SettingsKey;
use super::settings::Settings;
use crate::error::{Result, SimPolarsError};
use crate::logging::LoggingConfig;

const LOGGING_SECTION: &str = "logging";

/// Default location of the config file (`<config dir>/simpolars/config.ini`).
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("simpolars")
        .join("config.ini")
}

/// Settings and logging options as stored on disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub settings: Settings,
    pub logging: LoggingConfig,
}

impl ConfigFile {
    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| SimPolarsError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();

        for key in SettingsKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.name()) {
                key.set(&mut config.settings, value)
                    .map_err(|e| SimPolarsError::ConfigParse {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    })?;
            }
        }
        config
            .settings
            .validate()
            .map_err(|e| SimPolarsError::ConfigParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if let Some(level) = ini.get_from(Some(LOGGING_SECTION), "level") {
            config.logging.level = level.trim().to_string();
        }
        if let Some(file) = ini.get_from(Some(LOGGING_SECTION), "file") {
            let file = file.trim();
            config.logging.file = (!file.is_empty()).then(|| PathBuf::from(file));
        }

        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let mut ini = Ini::new();

        for key in SettingsKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.name(), key.get(&self.settings));
        }

        ini.with_section(Some(LOGGING_SECTION))
            .set("level", self.logging.level.as_str());
        if let Some(ref file) = self.logging.file {
            ini.with_section(Some(LOGGING_SECTION))
                .set("file", file.to_string_lossy().to_string());
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        ini.write_to_file(path)?;

        tracing::debug!(path = %path.display(), "Config file saved");
        Ok(())
    }
}
