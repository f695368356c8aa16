//! Settings keys with typed get/set.

use std::str::FromStr;

use super::settings::{Settings, SpeedMeasurement};
use crate::error::{Result, SimPolarsError};

/// A settings key, addressable as `name` or `section.name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsKey {
    AirspeedMinKph,
    AirspeedMaxKph,
    SinkMinMs,
    SinkMaxMs,
    CurveResolution,
    HidePoints,
    ShowCurve,
    Precision,
    SpeedMeasurement,
    SmoothingAlpha,
    ForceHorizontalFlight,
    StallBreakpointDeg,
    VariableTimer,
    FixedIntervalMs,
    IntervalMinMs,
    IntervalMaxMs,
}

impl SettingsKey {
    /// All keys, grouped by section.
    pub fn all() -> &'static [SettingsKey] {
        &[
            SettingsKey::AirspeedMinKph,
            SettingsKey::AirspeedMaxKph,
            SettingsKey::SinkMinMs,
            SettingsKey::SinkMaxMs,
            SettingsKey::CurveResolution,
            SettingsKey::HidePoints,
            SettingsKey::ShowCurve,
            SettingsKey::Precision,
            SettingsKey::SpeedMeasurement,
            SettingsKey::SmoothingAlpha,
            SettingsKey::ForceHorizontalFlight,
            SettingsKey::StallBreakpointDeg,
            SettingsKey::VariableTimer,
            SettingsKey::FixedIntervalMs,
            SettingsKey::IntervalMinMs,
            SettingsKey::IntervalMaxMs,
        ]
    }

    /// Canonical key name.
    pub fn name(&self) -> &'static str {
        match self {
            SettingsKey::AirspeedMinKph => "airspeed_min_kph",
            SettingsKey::AirspeedMaxKph => "airspeed_max_kph",
            SettingsKey::SinkMinMs => "sink_min_ms",
            SettingsKey::SinkMaxMs => "sink_max_ms",
            SettingsKey::CurveResolution => "curve_resolution",
            SettingsKey::HidePoints => "hide_points",
            SettingsKey::ShowCurve => "show_curve",
            SettingsKey::Precision => "precision",
            SettingsKey::SpeedMeasurement => "speed_measurement",
            SettingsKey::SmoothingAlpha => "smoothing_alpha",
            SettingsKey::ForceHorizontalFlight => "force_horizontal_flight",
            SettingsKey::StallBreakpointDeg => "stall_breakpoint_deg",
            SettingsKey::VariableTimer => "variable_timer",
            SettingsKey::FixedIntervalMs => "fixed_interval_ms",
            SettingsKey::IntervalMinMs => "interval_min_ms",
            SettingsKey::IntervalMaxMs => "interval_max_ms",
        }
    }

    /// Config file section holding this key.
    pub fn section(&self) -> &'static str {
        match self {
            SettingsKey::AirspeedMinKph
            | SettingsKey::AirspeedMaxKph
            | SettingsKey::SinkMinMs
            | SettingsKey::SinkMaxMs
            | SettingsKey::CurveResolution
            | SettingsKey::HidePoints
            | SettingsKey::ShowCurve => "graph",
            SettingsKey::Precision
            | SettingsKey::SpeedMeasurement
            | SettingsKey::SmoothingAlpha => "capture",
            SettingsKey::ForceHorizontalFlight | SettingsKey::StallBreakpointDeg => "autotrim",
            SettingsKey::VariableTimer
            | SettingsKey::FixedIntervalMs
            | SettingsKey::IntervalMinMs
            | SettingsKey::IntervalMaxMs => "timer",
        }
    }

    /// Declared value type, for listings and error messages.
    pub fn value_type(&self) -> &'static str {
        match self {
            SettingsKey::AirspeedMinKph
            | SettingsKey::AirspeedMaxKph
            | SettingsKey::SinkMinMs
            | SettingsKey::SinkMaxMs
            | SettingsKey::Precision
            | SettingsKey::SmoothingAlpha
            | SettingsKey::StallBreakpointDeg => "double",
            SettingsKey::CurveResolution
            | SettingsKey::FixedIntervalMs
            | SettingsKey::IntervalMinMs
            | SettingsKey::IntervalMaxMs => "int",
            SettingsKey::HidePoints
            | SettingsKey::ShowCurve
            | SettingsKey::ForceHorizontalFlight
            | SettingsKey::VariableTimer => "bool",
            SettingsKey::SpeedMeasurement => "speed",
        }
    }

    /// Current value as text.
    pub fn get(&self, settings: &Settings) -> String {
        match self {
            SettingsKey::AirspeedMinKph => settings.airspeed_min_kph.to_string(),
            SettingsKey::AirspeedMaxKph => settings.airspeed_max_kph.to_string(),
            SettingsKey::SinkMinMs => settings.sink_min_ms.to_string(),
            SettingsKey::SinkMaxMs => settings.sink_max_ms.to_string(),
            SettingsKey::CurveResolution => settings.curve_resolution.to_string(),
            SettingsKey::HidePoints => settings.hide_points.to_string(),
            SettingsKey::ShowCurve => settings.show_curve.to_string(),
            SettingsKey::Precision => settings.precision.to_string(),
            SettingsKey::SpeedMeasurement => settings.speed_measurement.to_string(),
            SettingsKey::SmoothingAlpha => settings.smoothing_alpha.to_string(),
            SettingsKey::ForceHorizontalFlight => settings.force_horizontal_flight.to_string(),
            SettingsKey::StallBreakpointDeg => settings.stall_breakpoint_deg.to_string(),
            SettingsKey::VariableTimer => settings.variable_timer.to_string(),
            SettingsKey::FixedIntervalMs => settings.fixed_interval_ms.to_string(),
            SettingsKey::IntervalMinMs => settings.interval_min_ms.to_string(),
            SettingsKey::IntervalMaxMs => settings.interval_max_ms.to_string(),
        }
    }

    /// Parse `value` by the key's declared type and store it.
    ///
    /// Only the value itself is checked here; cross-field invariants are
    /// checked by [`Settings::validate`].
    pub fn set(&self, settings: &mut Settings, value: &str) -> Result<()> {
        match self {
            SettingsKey::AirspeedMinKph => settings.airspeed_min_kph = self.parse_double(value)?,
            SettingsKey::AirspeedMaxKph => settings.airspeed_max_kph = self.parse_double(value)?,
            SettingsKey::SinkMinMs => settings.sink_min_ms = self.parse_double(value)?,
            SettingsKey::SinkMaxMs => settings.sink_max_ms = self.parse_double(value)?,
            SettingsKey::CurveResolution => {
                settings.curve_resolution = self.parse_int(value)? as usize
            }
            SettingsKey::HidePoints => settings.hide_points = self.parse_bool(value)?,
            SettingsKey::ShowCurve => settings.show_curve = self.parse_bool(value)?,
            SettingsKey::Precision => settings.precision = self.parse_double(value)?,
            SettingsKey::SpeedMeasurement => {
                settings.speed_measurement = value
                    .parse::<SpeedMeasurement>()
                    .map_err(|reason| SimPolarsError::invalid_value(self.name(), value, reason))?
            }
            SettingsKey::SmoothingAlpha => settings.smoothing_alpha = self.parse_double(value)?,
            SettingsKey::ForceHorizontalFlight => {
                settings.force_horizontal_flight = self.parse_bool(value)?
            }
            SettingsKey::StallBreakpointDeg => {
                settings.stall_breakpoint_deg = self.parse_double(value)?
            }
            SettingsKey::VariableTimer => settings.variable_timer = self.parse_bool(value)?,
            SettingsKey::FixedIntervalMs => settings.fixed_interval_ms = self.parse_int(value)?,
            SettingsKey::IntervalMinMs => settings.interval_min_ms = self.parse_int(value)?,
            SettingsKey::IntervalMaxMs => settings.interval_max_ms = self.parse_int(value)?,
        }
        Ok(())
    }

    fn parse_double(&self, value: &str) -> Result<f64> {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| SimPolarsError::invalid_value(self.name(), value, "expected a number"))
    }

    /// Accepts `50` as well as `50.0`, which JSON writers tend to produce.
    fn parse_int(&self, value: &str) -> Result<u64> {
        let trimmed = value.trim();
        if let Ok(v) = trimmed.parse::<u64>() {
            return Ok(v);
        }
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
            .map(|v| v as u64)
            .ok_or_else(|| {
                SimPolarsError::invalid_value(self.name(), value, "expected a non-negative integer")
            })
    }

    fn parse_bool(&self, value: &str) -> Result<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(SimPolarsError::invalid_value(
                self.name(),
                value,
                "expected true or false",
            )),
        }
    }
}

impl FromStr for SettingsKey {
    type Err = SimPolarsError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        SettingsKey::all()
            .iter()
            .copied()
            .find(|key| {
                name == key.name()
                    || name
                        .split_once('.')
                        .is_some_and(|(section, rest)| {
                            section == key.section() && rest == key.name()
                        })
            })
            .ok_or_else(|| SimPolarsError::UnknownSettingsKey(s.to_string()))
    }
}

impl std::fmt::Display for SettingsKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.section(), self.name())
    }
}
