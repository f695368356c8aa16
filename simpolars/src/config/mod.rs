//! Configuration: engine settings, their keys, and the INI config file.
//!
//! # Example Configuration (INI)
//!
//! ```ini
//! [graph]
//! airspeed_min_kph = 60
//! airspeed_max_kph = 220
//! sink_min_ms = -1
//! sink_max_ms = 5
//! curve_resolution = 50
//!
//! [capture]
//! precision = 1
//! speed_measurement = true
//! smoothing_alpha = 0.5
//!
//! [autotrim]
//! force_horizontal_flight = false
//! stall_breakpoint_deg = 10
//!
//! [timer]
//! variable_timer = true
//!
//! [logging]
//! level = info
//! ```

mod file;
mod key;
mod settings;

pub use file::{config_file_path, ConfigFile};
pub use key::SettingsKey;
pub use settings::{Settings, SpeedMeasurement};
