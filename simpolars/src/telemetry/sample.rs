//! Telemetry sample model.
//!
//! Every measured field is optional. A field stays `None` until the feed has
//! reported it, so a legitimate zero (sea-level altitude, wings level) is
//! never confused with "not yet received".

use serde::{Deserialize, Serialize};

/// A simulator variable tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TelemetryItem {
    Altitude,
    AirspeedTrue,
    AirspeedIndicated,
    VerticalSpeed,
    FlapsHandleIndex,
    FlapsHandleCount,
    TotalWeight,
    WingArea,
    Pitch,
    Bank,
    AngleOfAttack,
    RollRate,
}

impl TelemetryItem {
    /// All tracked items, in request-id order.
    pub fn all() -> &'static [TelemetryItem] {
        &[
            TelemetryItem::Altitude,
            TelemetryItem::AirspeedTrue,
            TelemetryItem::AirspeedIndicated,
            TelemetryItem::VerticalSpeed,
            TelemetryItem::FlapsHandleIndex,
            TelemetryItem::FlapsHandleCount,
            TelemetryItem::TotalWeight,
            TelemetryItem::WingArea,
            TelemetryItem::Pitch,
            TelemetryItem::Bank,
            TelemetryItem::AngleOfAttack,
            TelemetryItem::RollRate,
        ]
    }

    /// Simulator variable name used when registering the data definition.
    pub fn simvar(&self) -> &'static str {
        match self {
            TelemetryItem::Altitude => "PLANE ALTITUDE",
            TelemetryItem::AirspeedTrue => "AIRSPEED TRUE",
            TelemetryItem::AirspeedIndicated => "AIRSPEED INDICATED",
            TelemetryItem::VerticalSpeed => "VERTICAL SPEED",
            TelemetryItem::FlapsHandleIndex => "FLAPS HANDLE INDEX",
            TelemetryItem::FlapsHandleCount => "FLAPS NUM HANDLE POSITIONS",
            TelemetryItem::TotalWeight => "TOTAL WEIGHT",
            TelemetryItem::WingArea => "WING AREA",
            TelemetryItem::Pitch => "PLANE PITCH DEGREES",
            TelemetryItem::Bank => "PLANE BANK DEGREES",
            TelemetryItem::AngleOfAttack => "INCIDENCE ALPHA",
            TelemetryItem::RollRate => "ROTATION VELOCITY BODY Z",
        }
    }

    /// Unit the value is requested in.
    pub fn unit(&self) -> &'static str {
        match self {
            TelemetryItem::Altitude => "meters",
            TelemetryItem::AirspeedTrue
            | TelemetryItem::AirspeedIndicated
            | TelemetryItem::VerticalSpeed => "meters per second",
            TelemetryItem::FlapsHandleIndex | TelemetryItem::FlapsHandleCount => "number",
            TelemetryItem::TotalWeight => "kilograms",
            TelemetryItem::WingArea => "square meters",
            TelemetryItem::Pitch | TelemetryItem::Bank | TelemetryItem::AngleOfAttack => {
                "degrees"
            }
            TelemetryItem::RollRate => "degrees per second",
        }
    }
}

impl std::fmt::Display for TelemetryItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.simvar())
    }
}

/// One value delivered by the telemetry source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryReading {
    pub item: TelemetryItem,
    pub value: f64,
}

impl TelemetryReading {
    pub fn new(item: TelemetryItem, value: f64) -> Self {
        Self { item, value }
    }
}

/// Snapshot of the aircraft state at one tick.
///
/// Serialized as one JSON object per line for recorded telemetry streams;
/// absent fields are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySample {
    /// Tick time in seconds since the session clock started.
    pub timestamp_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airspeed_true_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airspeed_indicated_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_speed_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flap_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flap_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wing_area_m2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle_of_attack_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_rate_deg_s: Option<f64>,
}

impl TelemetrySample {
    /// Create an empty sample stamped with `timestamp_s`.
    pub fn new(timestamp_s: f64) -> Self {
        Self {
            timestamp_s,
            ..Default::default()
        }
    }

    /// Builder form of [`apply`](Self::apply).
    pub fn with(mut self, item: TelemetryItem, value: f64) -> Self {
        self.apply(item, value);
        self
    }

    /// Store a reported value in the matching field.
    ///
    /// Non-finite values leave the field unset. Count-like items must be
    /// non-negative to be accepted.
    pub fn apply(&mut self, item: TelemetryItem, value: f64) {
        let measured = value.is_finite().then_some(value);
        let count = measured.filter(|v| *v >= 0.0).map(|v| v.round() as usize);

        match item {
            TelemetryItem::Altitude => self.altitude_m = measured,
            TelemetryItem::AirspeedTrue => self.airspeed_true_ms = measured,
            TelemetryItem::AirspeedIndicated => self.airspeed_indicated_ms = measured,
            TelemetryItem::VerticalSpeed => self.vertical_speed_ms = measured,
            TelemetryItem::FlapsHandleIndex => self.flap_index = count,
            TelemetryItem::FlapsHandleCount => self.flap_count = count,
            TelemetryItem::TotalWeight => self.weight_kg = measured,
            TelemetryItem::WingArea => self.wing_area_m2 = measured,
            TelemetryItem::Pitch => self.pitch_deg = measured,
            TelemetryItem::Bank => self.bank_deg = measured,
            TelemetryItem::AngleOfAttack => self.angle_of_attack_deg = measured,
            TelemetryItem::RollRate => self.roll_rate_deg_s = measured,
        }
    }

    /// Read a field back as a raw value.
    pub fn value(&self, item: TelemetryItem) -> Option<f64> {
        match item {
            TelemetryItem::Altitude => self.altitude_m,
            TelemetryItem::AirspeedTrue => self.airspeed_true_ms,
            TelemetryItem::AirspeedIndicated => self.airspeed_indicated_ms,
            TelemetryItem::VerticalSpeed => self.vertical_speed_ms,
            TelemetryItem::FlapsHandleIndex => self.flap_index.map(|v| v as f64),
            TelemetryItem::FlapsHandleCount => self.flap_count.map(|v| v as f64),
            TelemetryItem::TotalWeight => self.weight_kg,
            TelemetryItem::WingArea => self.wing_area_m2,
            TelemetryItem::Pitch => self.pitch_deg,
            TelemetryItem::Bank => self.bank_deg,
            TelemetryItem::AngleOfAttack => self.angle_of_attack_deg,
            TelemetryItem::RollRate => self.roll_rate_deg_s,
        }
    }

    /// Copy every field that is set in `other` into this sample.
    pub fn merge_from(&mut self, other: &TelemetrySample) {
        for item in TelemetryItem::all() {
            if let Some(value) = other.value(*item) {
                self.apply(*item, value);
            }
        }
    }

    /// Whether any measured field has been reported.
    pub fn has_any(&self) -> bool {
        TelemetryItem::all()
            .iter()
            .any(|item| self.value(*item).is_some())
    }
}
