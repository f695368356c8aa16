//! Writes from the session back to the simulator.

use serde::{Deserialize, Serialize};

use crate::autotrim::ControlCommand;

/// A simulator variable held at a fixed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimOverride {
    pub variable: String,
    pub value: f64,
}

impl SimOverride {
    pub fn new(variable: impl Into<String>, value: f64) -> Self {
        Self {
            variable: variable.into(),
            value,
        }
    }
}

impl std::fmt::Display for SimOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.variable, self.value)
    }
}

/// Control collaborator. Implementations must not block.
pub trait ControlSink {
    /// Set aileron and elevator deflection.
    fn write_controls(&mut self, command: ControlCommand);

    /// Set an arbitrary simulator variable.
    fn write_override(&mut self, value: &SimOverride);
}

/// Writes issued when a capture starts: level attitude, a fast straight
/// entry and an empty centre tank.
pub fn capture_start_presets() -> Vec<SimOverride> {
    vec![
        SimOverride::new("PLANE PITCH DEGREES", 0.0),
        SimOverride::new("PLANE BANK DEGREES", 0.0),
        SimOverride::new("VELOCITY BODY Z", 200.0),
        SimOverride::new("FUEL TANK CENTER LEVEL:1", 0.0),
    ]
}
