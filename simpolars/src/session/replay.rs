//! Recorded telemetry streams.
//!
//! A recording is JSON lines, one [`TelemetrySample`] object per line:
//!
//! ```text
//! {"timestamp_s":0.0,"altitude_m":1200.0,"airspeed_true_ms":25.0,"flap_index":0}
//! {"timestamp_s":0.1,"altitude_m":1199.9,"airspeed_true_ms":25.1,"flap_index":0}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::io::BufRead;

use crate::error::{Result, SimPolarsError};
use crate::polar::CaptureOutcome;
use crate::telemetry::{RequestId, TelemetrySample, TelemetrySource};

use super::TickReport;

/// Iterate the samples of a recording.
pub fn read_records<R: BufRead>(reader: R) -> impl Iterator<Item = Result<TelemetrySample>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(SimPolarsError::Io(e))),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            Some(
                serde_json::from_str(trimmed).map_err(|e| SimPolarsError::ReplayParse {
                    line: index + 1,
                    reason: e.to_string(),
                }),
            )
        })
}

/// Source for replays: requests go nowhere.
#[derive(Debug, Default)]
pub struct NullSource {
    pub requests: usize,
}

impl TelemetrySource for NullSource {
    fn poll(&mut self, _request: RequestId) {
        self.requests += 1;
    }
}

/// Counters accumulated over a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub ticks: usize,
    pub derived: usize,
    pub stored: usize,
    pub rejected: usize,
}

impl ReplayStats {
    pub fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        if report.performance.is_some() {
            self.derived += 1;
        }
        match report.capture {
            Some(CaptureOutcome::Stored { .. }) => self.stored += 1,
            Some(CaptureOutcome::Rejected(_)) => self.rejected += 1,
            None => {}
        }
    }
}

impl std::fmt::Display for ReplayStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ticks, {} derived, {} stored, {} rejected",
            self.ticks, self.derived, self.stored, self.rejected
        )
    }
}
