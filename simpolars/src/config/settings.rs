//! Engine settings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::key::SettingsKey;
use crate::curve::MAX_RESOLUTION;
use crate::error::{Result, SimPolarsError};

/// Which airspeed the polar is keyed and scaled by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedMeasurement {
    /// True airspeed.
    #[default]
    True,
    /// Indicated airspeed; sink rates are scaled by IAS/TAS.
    Indicated,
}

impl FromStr for SpeedMeasurement {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" | "tas" | "0" => Ok(SpeedMeasurement::True),
            "indicated" | "ias" | "1" => Ok(SpeedMeasurement::Indicated),
            other => Err(format!(
                "expected 'true' or 'indicated' (or 0/1), got '{}'",
                other
            )),
        }
    }
}

impl std::fmt::Display for SpeedMeasurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeedMeasurement::True => write!(f, "true"),
            SpeedMeasurement::Indicated => write!(f, "indicated"),
        }
    }
}

/// Settings that parameterize capture, display, autotrim and timing.
///
/// Read-only to the engine components; changed only through
/// [`Settings::set`], which rejects unknown keys and invalid values and
/// leaves the settings untouched on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Lower bound of the displayed and captured airspeed range (km/h).
    pub airspeed_min_kph: f64,
    /// Upper bound of the displayed and captured airspeed range (km/h).
    pub airspeed_max_kph: f64,
    /// Lower bound of the displayed sink range (m/s, positive down).
    pub sink_min_ms: f64,
    /// Upper bound of the displayed sink range (m/s, positive down).
    pub sink_max_ms: f64,
    /// Airspeed bucket width (m/s).
    pub precision: f64,
    /// Minimum allowed margin between 180° and |AoA| before the stall trip.
    pub stall_breakpoint_deg: f64,
    /// Number of segments of the fitted curve.
    pub curve_resolution: usize,
    pub speed_measurement: SpeedMeasurement,
    /// Engage the autotrim loop.
    pub force_horizontal_flight: bool,
    /// Omit raw captured points from rendering.
    pub hide_points: bool,
    /// Render the fitted curve.
    pub show_curve: bool,
    /// Weight of the stored value when blending a new capture (0..1).
    pub smoothing_alpha: f64,
    /// Derive the tick interval from airspeed change instead of a fixed period.
    pub variable_timer: bool,
    pub fixed_interval_ms: u64,
    pub interval_min_ms: u64,
    pub interval_max_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            airspeed_min_kph: 40.0,
            airspeed_max_kph: 200.0,
            sink_min_ms: -1.0,
            sink_max_ms: 5.0,
            precision: 1.0,
            stall_breakpoint_deg: 10.0,
            curve_resolution: 50,
            speed_measurement: SpeedMeasurement::True,
            force_horizontal_flight: false,
            hide_points: false,
            show_curve: true,
            smoothing_alpha: 0.5,
            variable_timer: false,
            fixed_interval_ms: 100,
            interval_min_ms: 20,
            interval_max_ms: 2000,
        }
    }
}

impl Settings {
    /// Read a setting by key name.
    pub fn get(&self, key: &str) -> Result<String> {
        let key: SettingsKey = key.parse()?;
        Ok(key.get(self))
    }

    /// Update a setting by key name.
    ///
    /// The write is rejected (and nothing changes) when the key is unknown,
    /// the value does not parse, or the result violates a range invariant.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key: SettingsKey = key.parse()?;
        let mut updated = self.clone();
        key.set(&mut updated, value)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<()> {
        if !(self.airspeed_min_kph < self.airspeed_max_kph) {
            return Err(SimPolarsError::invalid_value(
                SettingsKey::AirspeedMaxKph.name(),
                self.airspeed_max_kph.to_string(),
                format!("must be greater than airspeed_min_kph ({})", self.airspeed_min_kph),
            ));
        }
        if !(self.sink_min_ms < self.sink_max_ms) {
            return Err(SimPolarsError::invalid_value(
                SettingsKey::SinkMaxMs.name(),
                self.sink_max_ms.to_string(),
                format!("must be greater than sink_min_ms ({})", self.sink_min_ms),
            ));
        }
        if !(self.precision.is_finite() && self.precision > 0.0) {
            return Err(SimPolarsError::invalid_value(
                SettingsKey::Precision.name(),
                self.precision.to_string(),
                "must be a positive number",
            ));
        }
        if !(0.0..=180.0).contains(&self.stall_breakpoint_deg) {
            return Err(SimPolarsError::invalid_value(
                SettingsKey::StallBreakpointDeg.name(),
                self.stall_breakpoint_deg.to_string(),
                "must be between 0 and 180 degrees",
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing_alpha) {
            return Err(SimPolarsError::invalid_value(
                SettingsKey::SmoothingAlpha.name(),
                self.smoothing_alpha.to_string(),
                "must be in [0, 1)",
            ));
        }
        if !(1..=MAX_RESOLUTION).contains(&self.curve_resolution) {
            return Err(SimPolarsError::invalid_value(
                SettingsKey::CurveResolution.name(),
                self.curve_resolution.to_string(),
                format!("must be between 1 and {}", MAX_RESOLUTION),
            ));
        }
        if self.fixed_interval_ms == 0 {
            return Err(SimPolarsError::invalid_value(
                SettingsKey::FixedIntervalMs.name(),
                "0",
                "must be at least 1 ms",
            ));
        }
        if self.interval_min_ms == 0 || self.interval_min_ms > self.interval_max_ms {
            return Err(SimPolarsError::invalid_value(
                SettingsKey::IntervalMinMs.name(),
                self.interval_min_ms.to_string(),
                format!(
                    "must be between 1 and interval_max_ms ({})",
                    self.interval_max_ms
                ),
            ));
        }
        Ok(())
    }

    /// Load settings from a JSON object keyed by setting name.
    ///
    /// Keys that are not present keep their defaults. Values may be JSON
    /// numbers, booleans or strings.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value.as_object().ok_or_else(|| {
            SimPolarsError::invalid_value("settings", value.to_string(), "expected a JSON object")
        })?;

        let mut settings = Settings::default();
        for (name, raw) in object {
            let key: SettingsKey = name.parse()?;
            let text = match raw {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                other => {
                    return Err(SimPolarsError::invalid_value(
                        name.as_str(),
                        other.to_string(),
                        "expected a number, boolean or string",
                    ))
                }
            };
            key.set(&mut settings, &text)?;
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to the JSON object form read by [`from_json_str`](Self::from_json_str).
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.smoothing_alpha, 0.5);
        assert_eq!(settings.fixed_interval_ms, 100);
        assert_eq!(settings.speed_measurement, SpeedMeasurement::True);
    }

    #[test]
    fn test_set_and_get() {
        let mut settings = Settings::default();
        settings.set("airspeed_max_kph", "250").unwrap();
        assert_eq!(settings.airspeed_max_kph, 250.0);
        assert_eq!(settings.get("airspeed_max_kph").unwrap(), "250");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut settings = Settings::default();
        let err = settings.set("wingspan", "15").unwrap_err();
        assert!(matches!(err, SimPolarsError::UnknownSettingsKey(_)));
        assert!(matches!(
            settings.get("wingspan"),
            Err(SimPolarsError::UnknownSettingsKey(_))
        ));
    }

    #[test]
    fn test_rejected_write_leaves_settings_untouched() {
        let mut settings = Settings::default();
        let before = settings.clone();

        assert!(settings.set("airspeed_min_kph", "500").is_err());
        assert!(settings.set("precision", "0").is_err());
        assert!(settings.set("precision", "abc").is_err());
        assert!(settings.set("smoothing_alpha", "1.0").is_err());
        assert!(settings.set("curve_resolution", "0").is_err());
        assert!(settings.set("curve_resolution", "1000000000").is_err());

        assert_eq!(settings, before);
    }

    #[test]
    fn test_speed_measurement_parse() {
        assert_eq!("true".parse(), Ok(SpeedMeasurement::True));
        assert_eq!("IAS".parse(), Ok(SpeedMeasurement::Indicated));
        assert_eq!("1".parse(), Ok(SpeedMeasurement::Indicated));
        assert!("mach".parse::<SpeedMeasurement>().is_err());
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "airspeed_min_kph": 60,
            "airspeed_max_kph": 180.5,
            "curve_resolution": 80,
            "speed_measurement": 1,
            "force_horizontal_flight": true,
            "stall_breakpoint_deg": "12"
        }"#;

        let settings = Settings::from_json_str(json).unwrap();

        assert_eq!(settings.airspeed_min_kph, 60.0);
        assert_eq!(settings.airspeed_max_kph, 180.5);
        assert_eq!(settings.curve_resolution, 80);
        assert_eq!(settings.speed_measurement, SpeedMeasurement::Indicated);
        assert!(settings.force_horizontal_flight);
        assert_eq!(settings.stall_breakpoint_deg, 12.0);
        // untouched keys keep defaults
        assert_eq!(settings.precision, 1.0);
    }

    #[test]
    fn test_from_json_str_rejects_unknown_key() {
        let err = Settings::from_json_str(r#"{"flux_capacitor": 1}"#).unwrap_err();
        assert!(matches!(err, SimPolarsError::UnknownSettingsKey(_)));
    }

    #[test]
    fn test_from_json_str_rejects_non_object() {
        assert!(Settings::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::default();
        settings.set("speed_measurement", "indicated").unwrap();
        settings.set("sink_max_ms", "8").unwrap();

        let json = settings.to_json_string().unwrap();
        let parsed = Settings::from_json_str(&json).unwrap();

        assert_eq!(parsed, settings);
    }
}
