//! Integration tests for a complete capture session.
//!
//! These tests drive a [`Session`] the way a simulator host does:
//! - readings arrive through the telemetry channel or as whole samples
//! - every tick derives, captures, trims and polls
//! - captured polars are saved, imported back and rendered
//!
//! Run with: `cargo test --test session_integration`

use std::io::Cursor;

use simpolars::autotrim::{AutotrimState, ControlCommand};
use simpolars::config::Settings;
use simpolars::performance::STANDARD_GRAVITY;
use simpolars::polar::{CaptureOutcome, FlapIndex, JsonPolarFiles, PolarSummary};
use simpolars::session::{read_records, ControlSink, NullSource, ReplayStats, Session, SimOverride};
use simpolars::telemetry::{channel, TelemetryItem, TelemetryReading, TelemetrySample};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

#[derive(Default)]
struct RecordingSink {
    controls: Vec<ControlCommand>,
    overrides: Vec<SimOverride>,
}

impl ControlSink for RecordingSink {
    fn write_controls(&mut self, command: ControlCommand) {
        self.controls.push(command);
    }

    fn write_override(&mut self, value: &SimOverride) {
        self.overrides.push(value.clone());
    }
}

/// Sink rate of the synthetic glider (m/s, negative down).
fn polar_sink(airspeed_ms: f64) -> f64 {
    -(0.5 + 0.002 * (airspeed_ms - 22.0).powi(2))
}

/// A slow acceleration from 20 m/s through 50 m/s along the synthetic polar.
///
/// Altitude follows the polar sink minus the height traded for speed, so
/// the compensated sink equals the polar value.
fn accelerating_glide(dt: f64, ticks: usize) -> Vec<TelemetrySample> {
    let mut samples = Vec::with_capacity(ticks);
    let mut altitude = 2000.0;
    let mut airspeed: f64 = 20.0;
    for k in 0..ticks {
        samples.push(TelemetrySample {
            timestamp_s: k as f64 * dt,
            altitude_m: Some(altitude),
            airspeed_true_ms: Some(airspeed),
            airspeed_indicated_ms: Some(airspeed * 0.95),
            vertical_speed_ms: Some(polar_sink(airspeed)),
            flap_index: Some(2),
            flap_count: Some(4),
            weight_kg: Some(480.0),
            wing_area_m2: Some(10.5),
            pitch_deg: Some(1.0),
            bank_deg: Some(0.5),
            angle_of_attack_deg: Some(3.0),
            roll_rate_deg_s: Some(0.0),
        });

        let next = airspeed + 0.5 * dt;
        let mid = 0.5 * (airspeed + next);
        altitude += dt * polar_sink(mid) - (next * next - airspeed * airspeed) / (2.0 * STANDARD_GRAVITY);
        airspeed = next;
    }
    samples
}

fn run(session: &mut Session, samples: &[TelemetrySample], sink: &mut RecordingSink) -> ReplayStats {
    let mut source = NullSource::default();
    let mut stats = ReplayStats::default();
    for sample in samples {
        session.on_sample(sample);
        let report = session
            .tick(sample.timestamp_s, &mut source, sink)
            .expect("tick");
        stats.record(&report);
    }
    stats
}

// ============================================================================
// Capture
// ============================================================================

#[test]
fn test_capture_recovers_polar() {
    let mut session = Session::new(Settings::default());
    let mut sink = RecordingSink::default();
    session.connect();
    session.start_capture(&mut sink);

    let stats = run(&mut session, &accelerating_glide(0.5, 120), &mut sink);

    assert_eq!(stats.ticks, 120);
    assert_eq!(stats.derived, 119);
    assert_eq!(stats.stored, 119);

    let flap = FlapIndex::new(2).unwrap();
    let polar = session.store().flap(flap);
    assert!(polar.len() >= 25, "buckets: {}", polar.len());
    for (bucket, sink_rate) in polar {
        let expected = polar_sink(*bucket as f64 + 0.5);
        assert!(
            (sink_rate - expected).abs() < 0.15,
            "bucket {bucket}: {sink_rate} vs {expected}"
        );
    }

    let summary = PolarSummary::from_map(flap, polar, 1.0);
    let (min_sink_kph, _) = summary.min_sink.unwrap();
    // min sink of the synthetic polar is at 22 m/s ≈ 79 km/h
    assert!((min_sink_kph - 79.2).abs() < 4.0, "{min_sink_kph}");
}

#[test]
fn test_indicated_mode_keys_by_ias() {
    let settings = Settings {
        speed_measurement: "indicated".parse().unwrap(),
        ..Settings::default()
    };
    let mut session = Session::new(settings);
    let mut sink = RecordingSink::default();
    session.connect();
    session.start_capture(&mut sink);

    run(&mut session, &accelerating_glide(0.5, 40), &mut sink);

    let polar = session.store().flap(FlapIndex::new(2).unwrap());
    // TAS reaches 29.75 m/s; IAS is 95 % of that
    assert!(polar.keys().all(|bucket| *bucket <= 28));
}

#[test]
fn test_readings_through_channel() {
    let (tx, feed) = channel();
    let mut session = Session::new(Settings::default()).with_feed(feed);
    let mut source = NullSource::default();
    let mut sink = RecordingSink::default();
    session.connect();
    session.start_capture(&mut sink);

    let mut stored = 0;
    for sample in accelerating_glide(0.5, 10) {
        let tx = tx.clone();
        std::thread::spawn(move || {
            for item in TelemetryItem::all() {
                if let Some(value) = sample.value(*item) {
                    tx.send(TelemetryReading::new(*item, value));
                }
            }
        })
        .join()
        .unwrap();

        let report = session.tick(sample.timestamp_s, &mut source, &mut sink).unwrap();
        if matches!(report.capture, Some(CaptureOutcome::Stored { .. })) {
            stored += 1;
        }
    }

    // 20.0 to 22.25 m/s: nine captures blended into three buckets
    assert_eq!(stored, 9);
    let polar = session.store().flap(FlapIndex::new(2).unwrap());
    assert_eq!(polar.keys().copied().collect::<Vec<_>>(), vec![20, 21, 22]);
}

// ============================================================================
// Safety
// ============================================================================

#[test]
fn test_stall_during_capture_neutralizes_and_disconnects() {
    let settings = Settings {
        force_horizontal_flight: true,
        ..Settings::default()
    };
    let mut session = Session::new(settings);
    let mut sink = RecordingSink::default();
    session.connect();
    session.start_capture(&mut sink);

    let mut samples = accelerating_glide(0.5, 30);
    samples[20].angle_of_attack_deg = Some(-176.0);

    let stats = run(&mut session, &samples, &mut sink);

    assert_eq!(session.autotrim_state(), AutotrimState::Tripped);
    assert!(!session.is_connected());
    assert!(!session.is_capturing());
    assert_eq!(sink.controls.last(), Some(&ControlCommand::neutral()));
    // ticks 1..=19 controlled, tick 20 neutralized, nothing after
    assert_eq!(sink.controls.len(), 20);
    assert_eq!(stats.stored, 20);
}

// ============================================================================
// Persistence and rendering
// ============================================================================

#[test]
fn test_save_import_and_render() {
    let temp = TempDir::new().unwrap();
    let files = JsonPolarFiles::new(temp.path());

    let mut session = Session::new(Settings::default());
    let mut sink = RecordingSink::default();
    session.connect();
    session.start_capture(&mut sink);
    run(&mut session, &accelerating_glide(0.5, 60), &mut sink);

    let written = session.save(&files).unwrap();
    assert_eq!(written, vec![temp.path().join("flaps2.json")]);

    let captured = session.store().flap(FlapIndex::new(2).unwrap()).clone();

    let mut fresh = Session::new(Settings::default());
    fresh.select_flap(FlapIndex::new(5).unwrap());
    let missing = temp.path().join("flaps9.json");
    let imported = fresh
        .import(&files, &[written[0].clone(), written[0].clone(), missing])
        .unwrap();

    assert_eq!(imported, captured.len());
    let slot = fresh.store().flap(FlapIndex::new(5).unwrap());
    for (bucket, value) in &captured {
        assert!((slot[bucket] - value).abs() < 1e-9);
    }

    let frame = fresh.render_frame();
    assert_eq!(frame.series.len(), 1);
    assert_eq!(frame.series[0].label, "Flaps position #5");
    assert_eq!(frame.series[0].raw_points.len(), captured.len());
    assert_eq!(frame.series[0].curve.as_ref().map(Vec::len), Some(51));
    assert!(frame
        .series[0]
        .raw_points
        .iter()
        .all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y)));
}

#[test]
fn test_replay_recording() {
    let mut recording = String::from("# synthetic glide\n");
    for sample in accelerating_glide(0.5, 30) {
        recording.push_str(&serde_json::to_string(&sample).unwrap());
        recording.push('\n');
    }

    let samples: Vec<TelemetrySample> = read_records(Cursor::new(recording))
        .collect::<simpolars::Result<_>>()
        .unwrap();
    assert_eq!(samples.len(), 30);

    let mut session = Session::new(Settings::default());
    let mut sink = RecordingSink::default();
    session.connect();
    session.start_capture(&mut sink);
    let stats = run(&mut session, &samples, &mut sink);

    assert_eq!(stats.stored, 29);
    assert_eq!(stats.to_string(), "30 ticks, 29 derived, 29 stored, 0 rejected");
}
