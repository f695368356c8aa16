//! Sink rate and glide ratio derivation.
//!
//! # Formulas
//!
//! ```text
//! vertical_speed  = (h₂ − h₁) / Δt
//! te_compensation = (v₂² − v₁²) / (2 · Δt · g)
//! sink_rate       = vertical_speed + te_compensation      (× IAS/TAS in indicated mode)
//! glide_ratio     = airspeed / −sink_rate                 (when sink_rate < −0.1, else 99)
//! ```
//!
//! The compensation term converts kinetic energy gained or lost over the
//! interval into an equivalent height change, so a pull-up that trades speed
//! for height does not show as reduced sink.

mod estimator;

pub use estimator::{bucket_for, PerformanceEstimator, PerformanceSample};

pub use crate::config::SpeedMeasurement;

/// Standard gravity (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Glide ratio reported when the aircraft is not meaningfully descending.
pub const NO_GLIDE: f64 = 99.0;

/// Sink rate (m/s, negative down) below which a glide ratio is computed.
pub const GLIDE_SINK_THRESHOLD: f64 = -0.1;
