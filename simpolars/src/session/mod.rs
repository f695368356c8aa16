//! Capture session: the tick driver that owns every engine component.
//!
//! # Tick Order
//!
//! ```text
//! drain feed → stamp sample → estimate → auto-stop check → capture
//!            → write overrides → autotrim → schedule → poll telemetry
//! ```
//!
//! A tick that received no readings since the previous one only writes the
//! overrides and polls; the sample pair and every derived value stay as
//! they were.
//!
//! A stall trip neutralizes the controls and disconnects inside the same
//! tick, so nothing is written or requested after it.

mod control;
mod replay;

pub use control::{capture_start_presets, ControlSink, SimOverride};
pub use replay::{read_records, NullSource, ReplayStats};

use std::path::PathBuf;

use crate::autotrim::{AutotrimCommand, AutotrimController, AutotrimInput, AutotrimState};
use crate::config::Settings;
use crate::curve::{GraphSpace, RenderFrame};
use crate::error::Result;
use crate::performance::{PerformanceEstimator, PerformanceSample};
use crate::polar::{save_store, CaptureOutcome, FlapIndex, Persistence, PolarStore};
use crate::scheduler::AdaptiveScheduler;
use crate::telemetry::{
    PollSummary, RequestId, RequestTracker, SampleBuffer, TelemetryFeed, TelemetryItem, TelemetryReading,
    TelemetrySample, TelemetrySource,
};
use crate::MS_TO_KPH;

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub timestamp_s: f64,
    /// Performance derived from the latest pair, if it was usable.
    pub performance: Option<PerformanceSample>,
    /// Capture result when capturing and a performance sample existed.
    pub capture: Option<CaptureOutcome>,
    pub autotrim: AutotrimCommand,
    pub poll: PollSummary,
    /// Interval to wait before the next tick.
    pub next_interval_ms: u64,
    /// Capture ended because the airspeed dropped below the range.
    pub capture_stopped: bool,
    /// The stall guard disconnected the session.
    pub disconnected: bool,
}

impl TickReport {
    fn idle(timestamp_s: f64, next_interval_ms: u64) -> Self {
        Self {
            timestamp_s,
            performance: None,
            capture: None,
            autotrim: AutotrimCommand::Idle,
            poll: PollSummary::default(),
            next_interval_ms,
            capture_stopped: false,
            disconnected: false,
        }
    }
}

/// Owns the engine state and runs it one tick at a time.
pub struct Session {
    settings: Settings,
    buffer: SampleBuffer,
    pending: TelemetrySample,
    /// A reading arrived since the pending sample was last pushed.
    fresh: bool,
    estimator: PerformanceEstimator,
    store: PolarStore,
    autotrim: AutotrimController,
    scheduler: AdaptiveScheduler,
    requests: RequestTracker,
    feed: Option<TelemetryFeed>,
    overrides: Vec<SimOverride>,
    selected_flap: FlapIndex,
    connected: bool,
    capturing: bool,
    last_performance: Option<PerformanceSample>,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            estimator: PerformanceEstimator::from_settings(&settings),
            store: PolarStore::new(settings.smoothing_alpha),
            autotrim: AutotrimController::from_settings(&settings),
            scheduler: AdaptiveScheduler::from_settings(&settings),
            settings,
            buffer: SampleBuffer::new(),
            pending: TelemetrySample::default(),
            fresh: false,
            requests: RequestTracker::with_all_items(),
            feed: None,
            overrides: Vec::new(),
            selected_flap: FlapIndex::default(),
            connected: false,
            capturing: false,
            last_performance: None,
        }
    }

    /// Receive readings through a channel instead of direct calls.
    pub fn with_feed(mut self, feed: TelemetryFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &PolarStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PolarStore {
        &mut self.store
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn requests(&self) -> &RequestTracker {
        &self.requests
    }

    pub fn autotrim_state(&self) -> AutotrimState {
        self.autotrim.state()
    }

    pub fn scheduler(&self) -> &AdaptiveScheduler {
        &self.scheduler
    }

    pub fn last_performance(&self) -> Option<&PerformanceSample> {
        self.last_performance.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    // Connection

    /// The transport is up; requests may be issued.
    pub fn connect(&mut self) {
        if self.connected {
            return;
        }
        self.connected = true;
        self.requests.on_connect();
        tracing::info!("Telemetry source connected");
    }

    /// Drop the connection, stop capturing and disengage the autotrim.
    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        self.capturing = false;
        self.requests.on_disconnect();
        if self.autotrim.state() == AutotrimState::Engaged {
            self.autotrim.disengage();
        }
        self.buffer.clear();
        self.pending = TelemetrySample::default();
        self.fresh = false;
        self.last_performance = None;
        tracing::info!("Telemetry source disconnected");
    }

    // Capture

    /// Start capturing and put the aircraft into the capture start state.
    pub fn start_capture(&mut self, sink: &mut dyn ControlSink) {
        for preset in capture_start_presets() {
            sink.write_override(&preset);
        }
        self.capturing = true;
        tracing::info!(flap = %self.selected_flap, "Capture started");
    }

    pub fn stop_capture(&mut self) {
        if self.capturing {
            self.capturing = false;
            tracing::info!("Capture stopped");
        }
    }

    /// Polar slot that imports go to.
    pub fn select_flap(&mut self, flap: FlapIndex) {
        self.selected_flap = flap;
    }

    pub fn selected_flap(&self) -> FlapIndex {
        self.selected_flap
    }

    // Overrides

    /// Hold `variable` at `value`, re-written every tick.
    pub fn add_override(&mut self, variable: impl Into<String>, value: f64) {
        let variable = variable.into();
        tracing::info!(variable = %variable, value, "Override added");
        match self.overrides.iter_mut().find(|o| o.variable == variable) {
            Some(existing) => existing.value = value,
            None => self.overrides.push(SimOverride { variable, value }),
        }
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    pub fn overrides(&self) -> &[SimOverride] {
        &self.overrides
    }

    // Settings

    /// Update one setting by key and propagate it to the components.
    pub fn update_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.settings.set(key, value)?;
        self.propagate_settings();
        Ok(())
    }

    /// Replace all settings after validating them.
    pub fn replace_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.propagate_settings();
        Ok(())
    }

    fn propagate_settings(&mut self) {
        self.estimator = PerformanceEstimator::from_settings(&self.settings);
        self.store.set_alpha(self.settings.smoothing_alpha);
        self.autotrim.apply_settings(&self.settings);
        self.scheduler.apply_settings(&self.settings);
    }

    // Telemetry intake

    /// Record one value reported by the transport.
    pub fn on_reading(&mut self, reading: TelemetryReading) {
        self.pending.apply(reading.item, reading.value);
        self.requests.on_reading(reading.item);
        self.fresh = true;
    }

    /// Record the answer to a request issued through [`TelemetrySource::poll`].
    ///
    /// Returns `false` and ignores the value when the id is not one this
    /// session issued.
    pub fn on_response(&mut self, request: RequestId, value: f64) -> bool {
        match request.item() {
            Some(item) => {
                self.on_reading(TelemetryReading::new(item, value));
                true
            }
            None => {
                tracing::warn!(request = %request, value, "Response to unknown request ignored");
                false
            }
        }
    }

    /// Record every field set in `sample`.
    ///
    /// The sample's own timestamp is not used; the tick that pushes it
    /// stamps it with the session clock.
    pub fn on_sample(&mut self, sample: &TelemetrySample) {
        for item in TelemetryItem::all() {
            if let Some(value) = sample.value(*item) {
                self.on_reading(TelemetryReading::new(*item, value));
            }
        }
    }

    /// Apply everything waiting in the feed. Returns the number of readings.
    pub fn drain_feed(&mut self) -> usize {
        let readings = match self.feed.as_mut() {
            Some(feed) => feed.drain(),
            None => return 0,
        };
        let count = readings.len();
        for reading in readings {
            self.on_reading(reading);
        }
        count
    }

    // Tick

    /// Run one tick at session time `now_s`.
    ///
    /// Fails only when the telemetry reports a flap index outside the
    /// supported slots.
    pub fn tick(
        &mut self,
        now_s: f64,
        source: &mut dyn TelemetrySource,
        sink: &mut dyn ControlSink,
    ) -> Result<TickReport> {
        self.drain_feed();

        let mut report = TickReport::idle(now_s, self.scheduler.current_interval_ms());
        if !self.connected {
            return Ok(report);
        }

        // A tick without new readings leaves the pair untouched, so the
        // next pair spans exactly the time between the two readings.
        if !(self.fresh && self.pending.has_any()) {
            for preset in &self.overrides {
                sink.write_override(preset);
            }
            report.poll = self.requests.poll_all(source);
            return Ok(report);
        }
        let mut current = self.pending;
        current.timestamp_s = now_s;
        self.buffer.push(current);
        self.fresh = false;

        let flap = current.flap_index.map(FlapIndex::new).transpose()?;
        let elapsed_s = self.buffer.elapsed_s();

        let performance = match (self.buffer.pair(), elapsed_s) {
            (Some((previous, current)), Some(dt)) => self.estimator.estimate(previous, current, dt),
            _ => None,
        };
        self.last_performance = performance;
        report.performance = performance;

        if let (true, Some(airspeed_ms)) = (self.capturing, current.airspeed_true_ms) {
            if airspeed_ms * MS_TO_KPH < self.settings.airspeed_min_kph {
                self.stop_capture();
                report.capture_stopped = true;
            }
        }

        if self.capturing {
            if let (Some(perf), Some(flap)) = (performance, flap) {
                report.capture = Some(self.store.capture(
                    flap,
                    perf.airspeed_ms,
                    perf.sink_rate_ms,
                    &self.settings,
                ));
            }
        }

        for preset in &self.overrides {
            sink.write_override(preset);
        }

        report.autotrim = self.run_autotrim(&current, performance.as_ref(), elapsed_s);
        match report.autotrim {
            AutotrimCommand::Idle => {}
            AutotrimCommand::Control(command) => sink.write_controls(command),
            AutotrimCommand::Disconnect(command) => {
                sink.write_controls(command);
                self.disconnect();
                report.disconnected = true;
                return Ok(report);
            }
        }

        if let (Some((previous, current)), Some(dt)) = (self.buffer.pair(), elapsed_s) {
            if let (Some(v), Some(v_prev)) = (current.airspeed_true_ms, previous.airspeed_true_ms) {
                self.scheduler.observe(v, v_prev, dt);
            }
        }
        report.next_interval_ms = self.scheduler.current_interval_ms();

        report.poll = self.requests.poll_all(source);

        tracing::trace!(
            t = now_s,
            captured = report.capture.is_some(),
            interval_ms = report.next_interval_ms,
            "Tick"
        );

        Ok(report)
    }

    fn run_autotrim(
        &mut self,
        current: &TelemetrySample,
        performance: Option<&PerformanceSample>,
        elapsed_s: Option<f64>,
    ) -> AutotrimCommand {
        let vertical_speed = performance
            .map(|p| p.vertical_speed_ms)
            .or(current.vertical_speed_ms);
        let input = match (vertical_speed, elapsed_s) {
            (Some(vs), Some(dt)) => AutotrimInput::from_sample(current, vs, dt),
            _ => None,
        };
        match input {
            Some(input) => self.autotrim.update(&input),
            None => AutotrimCommand::Idle,
        }
    }

    // Data

    /// Average the given files into the selected flap slot.
    pub fn import(&mut self, persistence: &dyn Persistence, paths: &[PathBuf]) -> Result<usize> {
        let datasets = persistence.load(paths)?;
        Ok(self.store.import_average(self.selected_flap, &datasets))
    }

    /// Save every non-empty polar.
    pub fn save(&self, persistence: &dyn Persistence) -> Result<Vec<PathBuf>> {
        save_store(persistence, &self.store)
    }

    /// Drawing instructions for the current polars.
    pub fn render_frame(&self) -> RenderFrame {
        let weight = self.buffer.current().and_then(|s| s.weight_kg);
        GraphSpace::from_settings(&self.settings).frame(&self.store, &self.settings, weight)
    }
}
