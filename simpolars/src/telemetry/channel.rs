//! Channel between the telemetry transport and the session.
//!
//! The transport thread pushes readings as they arrive; the session drains
//! them without blocking at the start of each tick.

use tokio::sync::mpsc;

use super::sample::TelemetryReading;

/// Sending half, owned by the transport.
#[derive(Debug, Clone)]
pub struct TelemetrySender {
    tx: mpsc::UnboundedSender<TelemetryReading>,
}

impl TelemetrySender {
    /// Deliver a reading. Returns `false` once the session side is gone.
    pub fn send(&self, reading: TelemetryReading) -> bool {
        self.tx.send(reading).is_ok()
    }
}

/// Receiving half, drained by the session.
#[derive(Debug)]
pub struct TelemetryFeed {
    rx: mpsc::UnboundedReceiver<TelemetryReading>,
}

impl TelemetryFeed {
    /// Take every reading that has arrived so far.
    pub fn drain(&mut self) -> Vec<TelemetryReading> {
        let mut readings = Vec::new();
        while let Ok(reading) = self.rx.try_recv() {
            readings.push(reading);
        }
        readings
    }
}

/// Create a connected sender/feed pair.
pub fn channel() -> (TelemetrySender, TelemetryFeed) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TelemetrySender { tx }, TelemetryFeed { rx })
}
