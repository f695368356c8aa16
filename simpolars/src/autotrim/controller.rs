//! The autotrim state machine and its control laws.

use super::{
    AutotrimCommand, AutotrimState, ControlCommand, ControlState, CONTROL_LIMIT_DEG,
    ELEVATOR_FLOOR_DEG, ELEVATOR_RATE_DEG_S, ENGAGE_PITCH_LIMIT_DEG,
    ENGAGE_ROLL_RATE_LIMIT_DEG_S, RAMP_DURATION_S, VS_COMPENSATION_LIMIT,
};
use crate::config::Settings;
use crate::telemetry::TelemetrySample;

/// Settings the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutotrimConfig {
    /// `force_horizontal_flight`.
    pub enabled: bool,
    pub stall_breakpoint_deg: f64,
}

impl Default for AutotrimConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stall_breakpoint_deg: 10.0,
        }
    }
}

impl AutotrimConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            enabled: settings.force_horizontal_flight,
            stall_breakpoint_deg: settings.stall_breakpoint_deg,
        }
    }
}

/// Attitude inputs for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutotrimInput {
    pub pitch_deg: f64,
    pub bank_deg: f64,
    pub roll_rate_deg_s: f64,
    pub angle_of_attack_deg: f64,
    pub vertical_speed_ms: f64,
    pub elapsed_s: f64,
}

impl AutotrimInput {
    /// Build from a sample, or `None` if an attitude field is missing or
    /// `elapsed_s` is not a positive number.
    pub fn from_sample(sample: &TelemetrySample, vertical_speed_ms: f64, elapsed_s: f64) -> Option<Self> {
        if !(elapsed_s.is_finite() && elapsed_s > 0.0) || !vertical_speed_ms.is_finite() {
            return None;
        }
        Some(Self {
            pitch_deg: sample.pitch_deg?,
            bank_deg: sample.bank_deg?,
            roll_rate_deg_s: sample.roll_rate_deg_s?,
            angle_of_attack_deg: sample.angle_of_attack_deg?,
            vertical_speed_ms,
            elapsed_s,
        })
    }

    fn is_settled(&self) -> bool {
        self.pitch_deg.abs() < ENGAGE_PITCH_LIMIT_DEG
            && self.roll_rate_deg_s.abs() < ENGAGE_ROLL_RATE_LIMIT_DEG_S
    }

    fn stall_margin_deg(&self) -> f64 {
        180.0 - self.angle_of_attack_deg.abs()
    }
}

/// Wing leveller and pitch holder with a stall cutoff.
#[derive(Debug, Clone, Default)]
pub struct AutotrimController {
    config: AutotrimConfig,
    state: AutotrimState,
    controls: ControlState,
    engaged_s: f64,
}

impl AutotrimController {
    pub fn new(config: AutotrimConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(AutotrimConfig::from_settings(settings))
    }

    pub fn state(&self) -> AutotrimState {
        self.state
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn config(&self) -> &AutotrimConfig {
        &self.config
    }

    /// Re-read settings. Switching the loop off disengages it and re-arms a
    /// tripped stall guard.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.apply_config(AutotrimConfig::from_settings(settings));
    }

    pub fn apply_config(&mut self, config: AutotrimConfig) {
        self.config = config;
        if !config.enabled && self.state != AutotrimState::Disengaged {
            let was = self.state;
            self.disengage();
            tracing::info!(from = %was, "Autotrim switched off");
        }
    }

    /// Stop controlling and zero the loop memory.
    pub fn disengage(&mut self) {
        self.state = AutotrimState::Disengaged;
        self.reset();
    }

    fn reset(&mut self) {
        self.controls = ControlState::default();
        self.engaged_s = 0.0;
    }

    /// Advance the loop by one tick.
    pub fn update(&mut self, input: &AutotrimInput) -> AutotrimCommand {
        match self.state {
            AutotrimState::Tripped => return AutotrimCommand::Idle,
            AutotrimState::Disengaged => {
                if !(self.config.enabled && input.is_settled()) {
                    return AutotrimCommand::Idle;
                }
                self.state = AutotrimState::Engaged;
                self.reset();
                tracing::info!(
                    pitch = input.pitch_deg,
                    roll_rate = input.roll_rate_deg_s,
                    "Autotrim engaged"
                );
            }
            AutotrimState::Engaged => {}
        }

        if input.stall_margin_deg() < self.config.stall_breakpoint_deg {
            tracing::warn!(
                aoa = input.angle_of_attack_deg,
                breakpoint = self.config.stall_breakpoint_deg,
                "Stall margin exceeded, neutralizing controls and disconnecting"
            );
            self.state = AutotrimState::Tripped;
            self.reset();
            return AutotrimCommand::Disconnect(ControlCommand::neutral());
        }

        self.step(input);
        AutotrimCommand::Control(ControlCommand {
            aileron_deg: self.controls.aileron_deg,
            elevator_deg: self.controls.elevator_deg,
        })
    }

    fn step(&mut self, input: &AutotrimInput) {
        let dt = input.elapsed_s;
        self.engaged_s += dt;
        let c = &mut self.controls;

        c.ramp_factor = (self.engaged_s / RAMP_DURATION_S).min(1.0);

        let bank = input.bank_deg;
        c.aileron_deg = (bank.signum() * bank * bank).clamp(-CONTROL_LIMIT_DEG, CONTROL_LIMIT_DEG);

        let vs = input.vertical_speed_ms;
        c.vs_compensation = (c.vs_compensation - vs.signum() * vs.abs().sqrt() * dt)
            .clamp(-VS_COMPENSATION_LIMIT, VS_COMPENSATION_LIMIT);

        let target = (2.0 * input.pitch_deg + 1.0 + c.vs_compensation)
            .clamp(-CONTROL_LIMIT_DEG, CONTROL_LIMIT_DEG);

        let crosses_zero = (target < 0.0 && c.elevator_deg > 0.0) || (target > 0.0 && c.elevator_deg < 0.0);
        if crosses_zero {
            c.elevator_deg = 0.0;
        } else {
            let max_step = ELEVATOR_RATE_DEG_S * c.ramp_factor * dt;
            let delta = (target - c.elevator_deg).clamp(-max_step, max_step);
            c.elevator_deg = (c.elevator_deg + delta).max(ELEVATOR_FLOOR_DEG);
        }

        tracing::trace!(
            aileron = c.aileron_deg,
            elevator = c.elevator_deg,
            target,
            ramp = c.ramp_factor,
            vs_compensation = c.vs_compensation,
            "Autotrim step"
        );
    }
}
