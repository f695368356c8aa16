//! Autotrim and stall guard.
//!
//! Holds the aircraft in level, steady flight while a polar is captured.
//!
//! # Control Law
//!
//! ```text
//! aileron         = clamp(sign(bank) · bank², ±50)
//! vs_compensation = clamp(vs_compensation − sign(vs) · √|vs| · Δt, ±50)
//! target_elevator = clamp(2 · pitch + 1 + vs_compensation, ±50)
//! elevator        → target at ≤ 10 · ramp · Δt per tick, floored at −10
//! ramp            = min(1, engaged_time / 5 s)
//! ```
//!
//! # States
//!
//! ```text
//! Disengaged ──(enabled, |pitch| < 10°, |roll rate| < 10°/s)──► Engaged
//! Engaged ──(180° − |AoA| < stall breakpoint)──► Tripped (neutral, disconnect)
//! Engaged | Tripped ──(disabled)──► Disengaged
//! ```

mod controller;

pub use controller::{AutotrimConfig, AutotrimController, AutotrimInput};

/// Deflection limit of both axes (degrees).
pub const CONTROL_LIMIT_DEG: f64 = 50.0;

/// Limit of the accumulated vertical speed compensation.
pub const VS_COMPENSATION_LIMIT: f64 = 50.0;

/// Maximum elevator travel per second at full ramp (degrees).
pub const ELEVATOR_RATE_DEG_S: f64 = 10.0;

/// Lowest elevator deflection commanded (degrees).
pub const ELEVATOR_FLOOR_DEG: f64 = -10.0;

/// Time for the ramp factor to reach 1 after engagement.
pub const RAMP_DURATION_S: f64 = 5.0;

/// Largest |pitch| accepted for engagement (degrees).
pub const ENGAGE_PITCH_LIMIT_DEG: f64 = 10.0;

/// Largest |roll rate| accepted for engagement (degrees/s).
pub const ENGAGE_ROLL_RATE_LIMIT_DEG_S: f64 = 10.0;

/// Loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutotrimState {
    /// Not controlling.
    #[default]
    Disengaged,
    /// Writing controls every tick.
    Engaged,
    /// Stall guard fired; stays here until the loop is switched off.
    Tripped,
}

impl std::fmt::Display for AutotrimState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutotrimState::Disengaged => write!(f, "disengaged"),
            AutotrimState::Engaged => write!(f, "engaged"),
            AutotrimState::Tripped => write!(f, "tripped"),
        }
    }
}

/// Controller memory between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlState {
    pub aileron_deg: f64,
    pub elevator_deg: f64,
    /// 0..1, ramps up after engagement.
    pub ramp_factor: f64,
    /// Integral of climb/descent, clamped to ±50.
    pub vs_compensation: f64,
}

/// Control surface deflections to write.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlCommand {
    pub aileron_deg: f64,
    pub elevator_deg: f64,
}

impl ControlCommand {
    /// Both axes centred.
    pub fn neutral() -> Self {
        Self::default()
    }
}

/// What the owner must do after an update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutotrimCommand {
    /// Write nothing.
    Idle,
    /// Write these controls.
    Control(ControlCommand),
    /// Write these (neutral) controls once, then disconnect.
    Disconnect(ControlCommand),
}

impl AutotrimCommand {
    pub fn controls(&self) -> Option<ControlCommand> {
        match self {
            AutotrimCommand::Idle => None,
            AutotrimCommand::Control(c) | AutotrimCommand::Disconnect(c) => Some(*c),
        }
    }

    pub fn is_disconnect(&self) -> bool {
        matches!(self, AutotrimCommand::Disconnect(_))
    }
}
