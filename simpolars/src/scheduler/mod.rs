//! Adaptive telemetry polling interval.
//!
//! In variable mode the interval shortens as the aircraft accelerates, so
//! transients are sampled densely and steady glides sparsely:
//!
//! ```text
//! accel      = clamp(|v − v_prev| / Δt, 0.05, 0.5)
//! multiplier = |v| < 30 ? 1 − |v|/30 : 1
//! interval   = round(1000 · (1.1 − 2 · accel · multiplier))
//! ```
//!
//! The result is always clamped into `[min_interval_ms, max_interval_ms]`.

use std::time::Duration;

use crate::config::Settings;

/// Lower clamp of the airspeed change rate (m/s²).
pub const MIN_ACCELERATION: f64 = 0.05;

/// Upper clamp of the airspeed change rate (m/s²).
pub const MAX_ACCELERATION: f64 = 0.5;

/// Airspeed (m/s) below which the acceleration term is tapered.
pub const TAPER_AIRSPEED_MS: f64 = 30.0;

/// How the interval is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerMode {
    /// Constant period set externally.
    #[default]
    Fixed,
    /// Derived from airspeed change every tick.
    Variable,
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerMode::Fixed => write!(f, "fixed"),
            TimerMode::Variable => write!(f, "variable"),
        }
    }
}

/// Scheduler tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub mode: TimerMode,
    pub fixed_interval_ms: u64,
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            mode: TimerMode::Fixed,
            fixed_interval_ms: 100,
            min_interval_ms: 20,
            max_interval_ms: 2000,
        }
    }
}

impl SchedulerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            mode: if settings.variable_timer {
                TimerMode::Variable
            } else {
                TimerMode::Fixed
            },
            fixed_interval_ms: settings.fixed_interval_ms,
            min_interval_ms: settings.interval_min_ms,
            max_interval_ms: settings.interval_max_ms.max(settings.interval_min_ms),
        }
    }
}

/// Tracks the polling cadence between ticks.
#[derive(Debug, Clone)]
pub struct AdaptiveScheduler {
    config: SchedulerConfig,
    current_interval_ms: u64,
    last_airspeeds: Option<(f64, f64)>,
    last_elapsed_s: Option<f64>,
}

impl AdaptiveScheduler {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            current_interval_ms: clamp_interval(config.fixed_interval_ms as f64, &config),
            config,
            last_airspeeds: None,
            last_elapsed_s: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_config(SchedulerConfig::from_settings(settings))
    }

    /// Re-read timer settings. Switching to fixed mode resets the interval.
    pub fn apply_settings(&mut self, settings: &Settings) {
        let config = SchedulerConfig::from_settings(settings);
        if config == self.config {
            return;
        }
        if config.mode != self.config.mode {
            tracing::info!(mode = %config.mode, "Timer mode changed");
        }
        self.config = config;
        self.current_interval_ms = match config.mode {
            TimerMode::Fixed => clamp_interval(config.fixed_interval_ms as f64, &config),
            TimerMode::Variable => clamp_interval(self.current_interval_ms as f64, &config),
        };
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn mode(&self) -> TimerMode {
        self.config.mode
    }

    pub fn current_interval_ms(&self) -> u64 {
        self.current_interval_ms
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.current_interval_ms)
    }

    /// Last airspeed pair `(current, previous)` seen in variable mode.
    pub fn last_airspeeds(&self) -> Option<(f64, f64)> {
        self.last_airspeeds
    }

    pub fn last_elapsed_s(&self) -> Option<f64> {
        self.last_elapsed_s
    }

    /// Compute the interval for the given airspeed change without updating state.
    ///
    /// Non-positive or non-finite inputs return the current interval.
    pub fn next_interval_ms(&self, airspeed_ms: f64, airspeed_previous_ms: f64, elapsed_s: f64) -> u64 {
        match raw_interval_ms(airspeed_ms, airspeed_previous_ms, elapsed_s) {
            Some(raw) => clamp_interval(raw, &self.config),
            None => self.current_interval_ms,
        }
    }

    /// Feed one tick's airspeed pair and return the interval to wait next.
    ///
    /// Fixed mode ignores the inputs.
    pub fn observe(&mut self, airspeed_ms: f64, airspeed_previous_ms: f64, elapsed_s: f64) -> u64 {
        if self.config.mode == TimerMode::Fixed {
            return self.current_interval_ms;
        }

        let next = self.next_interval_ms(airspeed_ms, airspeed_previous_ms, elapsed_s);
        self.last_airspeeds = Some((airspeed_ms, airspeed_previous_ms));
        self.last_elapsed_s = Some(elapsed_s);

        if next != self.current_interval_ms {
            tracing::debug!(
                from_ms = self.current_interval_ms,
                to_ms = next,
                "Polling interval changed"
            );
            self.current_interval_ms = next;
        }
        next
    }
}

impl Default for AdaptiveScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Airspeed change rate clamped into `[MIN_ACCELERATION, MAX_ACCELERATION]`.
pub fn acceleration(airspeed_ms: f64, airspeed_previous_ms: f64, elapsed_s: f64) -> Option<f64> {
    if !(elapsed_s.is_finite() && elapsed_s > 0.0) {
        return None;
    }
    let rate = (airspeed_ms - airspeed_previous_ms).abs() / elapsed_s;
    if rate.is_nan() {
        return None;
    }
    Some(rate.clamp(MIN_ACCELERATION, MAX_ACCELERATION))
}

fn raw_interval_ms(airspeed_ms: f64, airspeed_previous_ms: f64, elapsed_s: f64) -> Option<f64> {
    let accel = acceleration(airspeed_ms, airspeed_previous_ms, elapsed_s)?;
    let speed = airspeed_ms.abs();
    let multiplier = if speed < TAPER_AIRSPEED_MS {
        1.0 - speed / TAPER_AIRSPEED_MS
    } else {
        1.0
    };
    Some((1000.0 * (1.1 - 2.0 * accel * multiplier)).round())
}

fn clamp_interval(raw_ms: f64, config: &SchedulerConfig) -> u64 {
    let min = config.min_interval_ms as f64;
    let max = config.max_interval_ms.max(config.min_interval_ms) as f64;
    raw_ms.clamp(min, max) as u64
}
