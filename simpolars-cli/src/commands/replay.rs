//! Replay command - drive a capture session from a recorded telemetry stream.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Args;
use simpolars::autotrim::ControlCommand;
use simpolars::polar::{JsonPolarFiles, PolarSummary};
use simpolars::session::{read_records, ControlSink, NullSource, ReplayStats, Session, SimOverride};

use super::common::CliRunner;
use crate::error::CliError;

/// Arguments for the replay command.
#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Recorded telemetry (JSON lines, one sample per line)
    pub recording: PathBuf,

    /// Write captured polars as flaps{N}.json into this directory
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Do not start a capture; only derive and report
    #[arg(long)]
    pub dry_run: bool,
}

/// Counts the writes a live session would have sent to the simulator.
#[derive(Debug, Default)]
struct CountingSink {
    controls: usize,
    overrides: usize,
}

impl ControlSink for CountingSink {
    fn write_controls(&mut self, command: ControlCommand) {
        tracing::trace!(aileron = command.aileron_deg, elevator = command.elevator_deg, "Control write");
        self.controls += 1;
    }

    fn write_override(&mut self, value: &SimOverride) {
        tracing::debug!(%value, "Override write");
        self.overrides += 1;
    }
}

/// Run the replay command.
pub fn run(args: ReplayArgs, config_path: Option<&Path>, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, verbose)?;
    runner.log_startup("replay");

    if !args.recording.exists() {
        return Err(CliError::MissingFile(args.recording));
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    })?;

    let mut session = Session::new(runner.config().settings.clone());
    let mut source = NullSource::default();
    let mut sink = CountingSink::default();
    let mut stats = ReplayStats::default();

    session.connect();
    if !args.dry_run {
        session.start_capture(&mut sink);
    }

    let reader = BufReader::new(File::open(&args.recording)?);
    for record in read_records(reader) {
        if shutdown.load(Ordering::SeqCst) {
            println!("Interrupted, stopping replay");
            break;
        }
        let sample = record?;
        session.on_sample(&sample);
        let report = session.tick(sample.timestamp_s, &mut source, &mut sink)?;
        stats.record(&report);

        if report.capture_stopped {
            println!("Capture stopped at t={:.1}s (airspeed below range)", sample.timestamp_s);
        }
        if report.disconnected {
            println!("Stall guard tripped at t={:.1}s, session disconnected", sample.timestamp_s);
            break;
        }
    }

    println!("Replay: {}", stats);
    println!(
        "Simulator writes: {} control, {} override",
        sink.controls, sink.overrides
    );
    println!();

    let precision = session.settings().precision;
    let mut any = false;
    for (flap, map) in session.store().non_empty() {
        println!("{}", PolarSummary::from_map(flap, map, precision));
        any = true;
    }
    if !any {
        println!("No polar points captured.");
    }

    if let Some(out) = args.out {
        let files = JsonPolarFiles::new(out);
        for path in session.save(&files)? {
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
